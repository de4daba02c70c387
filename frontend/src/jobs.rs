use crate::env_variable_utils::BACKEND_URL;
use crate::models::JobView;
use crate::router::Route;
use crate::utils::{absolute_url, format_iso8601_date, sleep_ms};
use crate::video::api::list_jobs;
use crate::video::components::JobStatusLine;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

const REFRESH_INTERVAL_MS: i32 = 3000;

#[function_component(JobsPage)]
pub fn jobs_page() -> Html {
    let jobs = use_state(Vec::<JobView>::new);
    let loading = use_state(|| true);
    let error_message = use_state(|| None::<String>);

    // Refresh until the page unmounts
    {
        let jobs = jobs.clone();
        let loading = loading.clone();
        let error_message = error_message.clone();

        use_effect_with((), move |_| {
            let active = Rc::new(Cell::new(true));
            {
                let active = active.clone();
                spawn_local(async move {
                    while active.get() {
                        match list_jobs().await {
                            Ok(items) => {
                                jobs.set(items);
                                error_message.set(None);
                            }
                            Err(e) => {
                                web_sys::console::error_1(&e.message.clone().into());
                                error_message.set(Some(format!("Failed to load jobs: {}", e.message)));
                            }
                        }
                        loading.set(false);
                        sleep_ms(REFRESH_INTERVAL_MS).await;
                    }
                });
            }
            move || active.set(false)
        });
    }

    html! {
        <div class="min-h-screen p-8">
            <div class="max-w-5xl mx-auto">
                <div class="flex justify-between items-center mb-6">
                    <h1 class="text-3xl font-bold text-gray-800">{"Jobs"}</h1>
                    <Link<Route> to={Route::Home} classes="text-blue-600 hover:underline">
                        {"Back to downloader"}
                    </Link<Route>>
                </div>

                {
                    if let Some(msg) = &*error_message {
                        html! { <p class="text-red-600 mb-4">{ msg.clone() }</p> }
                    } else {
                        html! {}
                    }
                }

                {
                    if *loading {
                        html! { <p class="text-gray-600">{"Loading jobs..."}</p> }
                    } else if jobs.is_empty() {
                        html! { <p class="text-gray-600">{"No jobs yet."}</p> }
                    } else {
                        html! {
                            <table class="w-full bg-white rounded-lg shadow text-sm">
                                <thead>
                                    <tr class="text-left border-b">
                                        <th class="p-2">{"Created"}</th>
                                        <th class="p-2">{"URL"}</th>
                                        <th class="p-2">{"Format"}</th>
                                        <th class="p-2">{"Status"}</th>
                                        <th class="p-2">{"File"}</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    { for jobs.iter().map(|job| html! {
                                        <tr key={job.id.clone()} class="border-b">
                                            <td class="p-2">{ format_iso8601_date(&job.created_at) }</td>
                                            <td class="p-2 break-all">{ job.url.clone() }</td>
                                            <td class="p-2">{ job.format_id.clone() }</td>
                                            <td class="p-2"><JobStatusLine job={job.clone()} /></td>
                                            <td class="p-2">
                                                {
                                                    if let Some(link) = &job.download_url {
                                                        html! {
                                                            <a class="text-blue-600 hover:underline"
                                                               href={absolute_url(&BACKEND_URL, link)}
                                                               target="_blank">{ job.filename.clone() }</a>
                                                        }
                                                    } else {
                                                        html! {}
                                                    }
                                                }
                                            </td>
                                        </tr>
                                    }) }
                                </tbody>
                            </table>
                        }
                    }
                }
            </div>
        </div>
    }
}
