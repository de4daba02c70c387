pub mod api;
pub mod components;

use crate::env_variable_utils::BACKEND_URL;
use crate::models::{JobView, SupportedSite, VideoMetadata};
use crate::router::Route;
use crate::utils::{absolute_url, sleep_ms};
use api::ApiError;
use components::{
    ErrorBanner, JobStatusLine, SupportedSitesPanel, UrlForm, VideoDetails, BEST_FORMAT,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

const JOB_POLL_INTERVAL_MS: i32 = 1000;

/// Hands the file to the browser as a download instead of playing it.
fn trigger_browser_download(href: &str, filename: &str) {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };
    let Ok(element) = document.create_element("a") else {
        return;
    };
    if let Ok(anchor) = element.dyn_into::<web_sys::HtmlAnchorElement>() {
        anchor.set_href(href);
        anchor.set_download(filename);
        anchor.click();
    }
}

fn report(error_message: &UseStateHandle<Option<ApiError>>, error: ApiError) {
    web_sys::console::error_1(&error.message.clone().into());
    error_message.set(Some(error));
}

#[function_component(DownloaderPage)]
pub fn downloader_page() -> Html {
    let url = use_state(String::new);
    let metadata = use_state(|| None::<VideoMetadata>);
    let selected_format = use_state(|| BEST_FORMAT.to_string());
    let player_url = use_state(|| None::<String>);
    let queued_job = use_state(|| None::<JobView>);
    let sites = use_state(Vec::<SupportedSite>::new);
    let loading = use_state(|| false);
    let busy = use_state(|| false);
    let error_message = use_state(|| None::<ApiError>);

    {
        let sites = sites.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match api::supported_sites().await {
                    Ok(list) => sites.set(list),
                    Err(e) => log::warn!("Failed to load supported sites: {}", e.message),
                }
            });
            || ()
        });
    }

    let on_input = {
        let url = url.clone();
        Callback::from(move |value: String| url.set(value))
    };

    let on_submit = {
        let url = url.clone();
        let metadata = metadata.clone();
        let selected_format = selected_format.clone();
        let player_url = player_url.clone();
        let loading = loading.clone();
        let error_message = error_message.clone();

        Callback::from(move |_: ()| {
            let target = url.trim().to_string();
            if target.is_empty() {
                error_message.set(Some(ApiError {
                    message: "Please enter a URL".to_string(),
                    suggestion: None,
                }));
                return;
            }

            loading.set(true);
            error_message.set(None);
            metadata.set(None);
            player_url.set(None);
            selected_format.set(BEST_FORMAT.to_string());

            let metadata = metadata.clone();
            let loading = loading.clone();
            let error_message = error_message.clone();
            spawn_local(async move {
                match api::fetch_video_info(&target).await {
                    Ok(info) => metadata.set(Some(info)),
                    Err(e) => report(&error_message, e),
                }
                loading.set(false);
            });
        })
    };

    let on_format_change = {
        let selected_format = selected_format.clone();
        Callback::from(move |format: String| selected_format.set(format))
    };

    // Play and Download both wait for the synchronous download endpoint.
    let run_download = |play: bool| {
        let url = url.clone();
        let selected_format = selected_format.clone();
        let player_url = player_url.clone();
        let busy = busy.clone();
        let error_message = error_message.clone();

        Callback::from(move |_: ()| {
            let target = url.trim().to_string();
            let format_id = (*selected_format).clone();
            let player_url = player_url.clone();
            let busy = busy.clone();
            let error_message = error_message.clone();

            busy.set(true);
            error_message.set(None);
            spawn_local(async move {
                match api::start_download(&target, &format_id).await {
                    Ok(response) => {
                        let href = absolute_url(&BACKEND_URL, &response.download_url);
                        if play {
                            player_url.set(Some(href));
                        } else {
                            trigger_browser_download(&href, &response.filename);
                        }
                    }
                    Err(e) => report(&error_message, e),
                }
                busy.set(false);
            });
        })
    };
    let on_play = run_download(true);
    let on_download = run_download(false);

    let on_queue = {
        let url = url.clone();
        let selected_format = selected_format.clone();
        let queued_job = queued_job.clone();
        let error_message = error_message.clone();

        Callback::from(move |_: ()| {
            let target = url.trim().to_string();
            let format_id = (*selected_format).clone();
            let queued_job = queued_job.clone();
            let error_message = error_message.clone();

            error_message.set(None);
            spawn_local(async move {
                let mut job = match api::submit_job(&target, &format_id).await {
                    Ok(job) => job,
                    Err(e) => {
                        report(&error_message, e);
                        return;
                    }
                };

                while !job.status.is_terminal() {
                    queued_job.set(Some(job.clone()));
                    sleep_ms(JOB_POLL_INTERVAL_MS).await;
                    job = match api::get_job(&job.id).await {
                        Ok(job) => job,
                        Err(e) => {
                            report(&error_message, e);
                            return;
                        }
                    };
                }
                queued_job.set(Some(job));
            });
        })
    };

    html! {
        <div class="min-h-screen p-8">
            <div class="max-w-3xl mx-auto">
                <div class="flex justify-between items-center mb-6">
                    <h1 class="text-3xl font-bold text-gray-800">
                        { crate::env_variable_utils::get_app_name() }
                    </h1>
                    <Link<Route> to={Route::Jobs} classes="text-blue-600 hover:underline">
                        {"Jobs"}
                    </Link<Route>>
                </div>

                <UrlForm
                    url={(*url).clone()}
                    loading={*loading}
                    on_input={on_input}
                    on_submit={on_submit}
                />

                {
                    if let Some(error) = &*error_message {
                        html! { <ErrorBanner error={error.clone()} /> }
                    } else {
                        html! {}
                    }
                }

                {
                    if let Some(info) = &*metadata {
                        html! {
                            <VideoDetails
                                metadata={info.clone()}
                                selected_format={(*selected_format).clone()}
                                busy={*busy}
                                on_format_change={on_format_change}
                                on_play={on_play}
                                on_download={on_download}
                                on_queue={on_queue}
                            />
                        }
                    } else {
                        html! {}
                    }
                }

                {
                    if *busy {
                        html! { <p class="text-gray-600 mb-4">{"Downloading, this can take a while..."}</p> }
                    } else {
                        html! {}
                    }
                }

                {
                    if let Some(src) = &*player_url {
                        html! {
                            <video class="w-full rounded mb-4" controls={true} autoplay={true} src={src.clone()} />
                        }
                    } else {
                        html! {}
                    }
                }

                {
                    if let Some(job) = &*queued_job {
                        html! {
                            <div class="bg-white rounded-lg shadow p-4 mb-4">
                                <p class="text-gray-700">{ format!("Job {}", job.id) }</p>
                                <JobStatusLine job={job.clone()} />
                                {
                                    if let Some(link) = &job.download_url {
                                        html! {
                                            <a class="ml-2 text-blue-600 hover:underline"
                                               href={absolute_url(&BACKEND_URL, link)}
                                               target="_blank">{"Open"}</a>
                                        }
                                    } else {
                                        html! {}
                                    }
                                }
                            </div>
                        }
                    } else {
                        html! {}
                    }
                }

                <SupportedSitesPanel sites={(*sites).clone()} />
            </div>
        </div>
    }
}
