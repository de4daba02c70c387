use crate::models::{JobView, SupportedSite, VideoMetadata};
use crate::utils::{format_duration, format_number};
use crate::video::api::ApiError;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

/// Format selector sent when the user keeps the default choice.
pub const BEST_FORMAT: &str = "best";

#[derive(Properties, PartialEq)]
pub struct UrlFormProps {
    pub url: String,
    pub loading: bool,
    pub on_input: Callback<String>,
    pub on_submit: Callback<()>,
}

#[function_component(UrlForm)]
pub fn url_form(props: &UrlFormProps) -> Html {
    let on_input = {
        let on_input = props.on_input.clone();
        Callback::from(move |e: InputEvent| {
            on_input.emit(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };

    let on_submit = {
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: web_sys::SubmitEvent| {
            e.prevent_default();
            on_submit.emit(());
        })
    };

    html! {
        <form onsubmit={on_submit} class="flex mb-4">
            <input
                type="url"
                class="flex-grow p-3 border border-gray-300 rounded-l-lg focus:outline-none focus:ring-2 focus:ring-blue-500"
                placeholder="Paste a video URL..."
                value={props.url.clone()}
                oninput={on_input}
                disabled={props.loading}
            />
            <button
                type="submit"
                class="bg-blue-600 text-white p-3 rounded-r-lg hover:bg-blue-700 disabled:opacity-50"
                disabled={props.loading}
            >
                { if props.loading { "Loading..." } else { "Get Info" } }
            </button>
        </form>
    }
}

#[derive(Properties, PartialEq)]
pub struct VideoDetailsProps {
    pub metadata: VideoMetadata,
    pub selected_format: String,
    pub busy: bool,
    pub on_format_change: Callback<String>,
    pub on_play: Callback<()>,
    pub on_download: Callback<()>,
    pub on_queue: Callback<()>,
}

#[function_component(VideoDetails)]
pub fn video_details(props: &VideoDetailsProps) -> Html {
    let metadata = &props.metadata;

    let on_change = {
        let on_format_change = props.on_format_change.clone();
        Callback::from(move |e: Event| {
            on_format_change.emit(e.target_unchecked_into::<HtmlSelectElement>().value());
        })
    };
    let emit = |callback: &Callback<()>| {
        let callback = callback.clone();
        Callback::from(move |_: MouseEvent| callback.emit(()))
    };

    html! {
        <div class="bg-white rounded-lg shadow p-4 mb-4">
            <div class="flex gap-4">
                {
                    if let Some(thumbnail) = &metadata.thumbnail {
                        html! { <img src={thumbnail.clone()} alt="thumbnail" class="w-48 rounded" /> }
                    } else {
                        html! {}
                    }
                }
                <div>
                    <h2 class="text-xl font-bold text-gray-800">
                        { metadata.title.clone().unwrap_or_else(|| "Untitled".to_string()) }
                    </h2>
                    <p class="text-gray-600">
                        { metadata.uploader.clone().unwrap_or_else(|| "Unknown uploader".to_string()) }
                    </p>
                    <p class="text-sm text-gray-500">
                        { metadata.duration.map(format_duration).unwrap_or_default() }
                        { metadata.view_count.map(|views| format!(" · {} views", format_number(views))).unwrap_or_default() }
                    </p>
                </div>
            </div>

            <div class="flex items-center gap-2 mt-4">
                <select class="p-2 border border-gray-300 rounded" onchange={on_change} disabled={props.busy}>
                    <option value={BEST_FORMAT} selected={props.selected_format == BEST_FORMAT}>
                        {"Best available"}
                    </option>
                    { for metadata.formats.iter().map(|format| html! {
                        <option
                            value={format.format_id.clone()}
                            selected={props.selected_format == format.format_id}
                        >
                            { format!("{}p ({})", format.quality, format.ext.clone().unwrap_or_else(|| "?".to_string())) }
                        </option>
                    }) }
                </select>
                <button class="bg-green-600 text-white px-4 py-2 rounded disabled:opacity-50"
                    onclick={emit(&props.on_play)} disabled={props.busy}>{"Play"}</button>
                <button class="bg-blue-600 text-white px-4 py-2 rounded disabled:opacity-50"
                    onclick={emit(&props.on_download)} disabled={props.busy}>{"Download"}</button>
                <button class="bg-gray-600 text-white px-4 py-2 rounded disabled:opacity-50"
                    onclick={emit(&props.on_queue)} disabled={props.busy}>{"Queue"}</button>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ErrorBannerProps {
    pub error: ApiError,
}

#[function_component(ErrorBanner)]
pub fn error_banner(props: &ErrorBannerProps) -> Html {
    html! {
        <div class="bg-red-100 border border-red-300 text-red-700 rounded p-3 mb-4">
            <p>{ format!("Error: {}", props.error.message) }</p>
            {
                if let Some(suggestion) = &props.error.suggestion {
                    html! { <p class="text-sm mt-1">{ suggestion.clone() }</p> }
                } else {
                    html! {}
                }
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct JobStatusLineProps {
    pub job: JobView,
}

#[function_component(JobStatusLine)]
pub fn job_status_line(props: &JobStatusLineProps) -> Html {
    let job = &props.job;
    let progress = job
        .progress
        .map(|p| format!(" {:.0}%", p))
        .unwrap_or_default();

    html! {
        <span class="text-sm">
            { format!("{}{}", job.status.label(), progress) }
            {
                if let Some(error) = &job.error {
                    html! { <span class="text-red-600">{ format!(" - {error}") }</span> }
                } else {
                    html! {}
                }
            }
        </span>
    }
}

#[derive(Properties, PartialEq)]
pub struct SupportedSitesProps {
    pub sites: Vec<SupportedSite>,
}

#[function_component(SupportedSitesPanel)]
pub fn supported_sites_panel(props: &SupportedSitesProps) -> Html {
    if props.sites.is_empty() {
        return html! {};
    }

    html! {
        <div class="bg-white rounded-lg shadow p-4">
            <h3 class="font-semibold text-gray-800 mb-2">{"Supported sites"}</h3>
            <ul class="grid grid-cols-2 gap-1 text-sm">
                { for props.sites.iter().map(|site| {
                    let class = if site.status.starts_with("Limited") { "text-yellow-700" } else { "text-gray-700" };
                    html! {
                        <li class={class}>
                            { format!("{} ({}) - {}", site.name, site.domain, site.status) }
                        </li>
                    }
                }) }
            </ul>
        </div>
    }
}
