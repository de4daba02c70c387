mod env_variable_utils;
mod jobs;
mod models;
mod router;
mod utils;
mod video;

use crate::env_variable_utils::{get_app_name, BACKEND_URL};
use crate::router::{switch, Route};
use web_sys::console;
use yew::prelude::*;
use yew_router::prelude::*;

#[function_component(App)]
pub fn app() -> Html {
    html! {
        <BrowserRouter>
            <Switch<Route> render={switch} />
        </BrowserRouter>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();

    let api = if BACKEND_URL.is_empty() {
        "same-origin"
    } else {
        BACKEND_URL.as_str()
    };
    console::log_1(&format!("NAME: \"{}\", API: \"{}\"", get_app_name(), api).into());
}
