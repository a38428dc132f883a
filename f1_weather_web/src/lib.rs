use std::rc::Rc;
use std::time::Duration;

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, HtmlSelectElement, ScrollBehavior, ScrollIntoViewOptions};

use f1_weather::{
    sanitize_driver, sanitize_year, AnalysisView, ErrorBanner, FormController, FormFields,
    HttpAnalysisClient, RenderedAnalysis, SubmitOutcome,
};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_COMMIT: &str = env!("GIT_COMMIT_HASH");

/// How long an error banner stays visible.
const ERROR_VISIBLE: Duration = Duration::from_secs(5);

/// Leptos-backed view slots, bound once when the component mounts. The
/// controller mutates the page only through these.
#[derive(Clone)]
struct SignalView {
    busy: WriteSignal<bool>,
    error: WriteSignal<Option<String>>,
    results: WriteSignal<Option<RenderedAnalysis>>,
    results_ref: NodeRef<html::Section>,
    banner: Rc<ErrorBanner>,
}

impl AnalysisView for SignalView {
    fn reset(&self) {
        self.results.set(None);
        self.error.set(None);
    }

    fn set_busy(&self, busy: bool) {
        self.busy.set(busy);
    }

    fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));
        let ticket = self.banner.post();
        let banner = Rc::clone(&self.banner);
        let clear = self.error;
        set_timeout(
            move || {
                if banner.expire(ticket) {
                    clear.set(None);
                }
            },
            ERROR_VISIBLE,
        );
    }

    fn show_results(&self, rendered: &RenderedAnalysis) {
        self.results.set(Some(rendered.clone()));
        if let Some(section) = self.results_ref.get_untracked() {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            section.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }
}

#[component]
pub fn App() -> impl IntoView {
    let (year, set_year) = create_signal(String::new());
    let (gp, set_gp) = create_signal(String::new());
    let (driver, set_driver) = create_signal(String::new());
    let (session_type, set_session_type) = create_signal(String::from("R"));
    let (busy, set_busy) = create_signal(false);
    let (error, set_error) = create_signal(Option::<String>::None);
    let (results, set_results) = create_signal(Option::<RenderedAnalysis>::None);
    let results_ref = create_node_ref::<html::Section>();

    let slots = SignalView {
        busy: set_busy,
        error: set_error,
        results: set_results,
        results_ref,
        banner: Rc::new(ErrorBanner::default()),
    };
    let origin = window().location().origin().unwrap_or_default();
    let controller = Rc::new(FormController::new(HttpAnalysisClient::new(&origin), slots));

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let fields = FormFields {
            year: year.get_untracked(),
            gp: gp.get_untracked(),
            driver: driver.get_untracked(),
            session_type: session_type.get_untracked(),
        };
        let controller = Rc::clone(&controller);
        spawn_local(async move {
            if let SubmitOutcome::Failed(err) = controller.handle_submit(fields).await {
                logging::error!("analysis failed: {err}");
            }
        });
    };

    view! {
        <main>
            <header>
                <h1>"F1 Weather Analysis"</h1>
                <p class="subtitle">"Correlate lap times with track temperature and rainfall."</p>
                <p class="note">{"Web version "}{APP_VERSION}{" ("}{APP_COMMIT}{")"}</p>
            </header>
            <form id="analysisForm" on:submit=on_submit>
                <label>"Year: "
                    <input id="year" name="year" type="text" inputmode="numeric" placeholder="2021"
                        prop:value=move || year.get()
                        on:input=move |ev| {
                            if let Some(t) = ev.target() {
                                if let Ok(input) = t.dyn_into::<HtmlInputElement>() {
                                    let cleaned = sanitize_year(&input.value());
                                    input.set_value(&cleaned);
                                    set_year.set(cleaned);
                                }
                            }
                        }
                    />
                </label>
                <label>"Grand Prix: "
                    <input id="gp" name="gp" type="text" placeholder="Monaco"
                        prop:value=move || gp.get()
                        on:input=move |ev| {
                            if let Some(t) = ev.target() {
                                if let Ok(input) = t.dyn_into::<HtmlInputElement>() {
                                    set_gp.set(input.value());
                                }
                            }
                        }
                    />
                </label>
                <label>"Driver: "
                    <input id="driver" name="driver" type="text" placeholder="HAM" maxlength="3"
                        prop:value=move || driver.get()
                        on:input=move |ev| {
                            if let Some(t) = ev.target() {
                                if let Ok(input) = t.dyn_into::<HtmlInputElement>() {
                                    let cleaned = sanitize_driver(&input.value());
                                    input.set_value(&cleaned);
                                    set_driver.set(cleaned);
                                }
                            }
                        }
                    />
                </label>
                <label>"Session: "
                    <select id="session_type" name="session_type"
                        prop:value=move || session_type.get()
                        on:change=move |ev| {
                            if let Some(t) = ev.target() {
                                if let Ok(select) = t.dyn_into::<HtmlSelectElement>() {
                                    set_session_type.set(select.value());
                                }
                            }
                        }>
                        <option value="R">"Race"</option>
                        <option value="Q">"Qualifying"</option>
                        <option value="S">"Sprint"</option>
                        <option value="FP1">"Practice 1"</option>
                        <option value="FP2">"Practice 2"</option>
                        <option value="FP3">"Practice 3"</option>
                    </select>
                </label>
                <button type="submit" disabled=move || busy.get() class:loading=move || busy.get()>
                    "Analyze"
                </button>
            </form>
            <div id="error" class="error"
                style:display=move || if error.get().is_some() { "block" } else { "none" }>
                {move || error.get().unwrap_or_default()}
            </div>
            <section id="results" class="results" node_ref=results_ref
                class:visible=move || results.get().is_some()>
                <img id="plot" alt="Lap time vs weather plot"
                    src=move || results.get().map(|r| r.plot_src).unwrap_or_default()
                />
                <p>"Track temp correlation: "
                    <span id="tempCorr">
                        {move || results.get().map(|r| r.temp_corr).unwrap_or_else(|| "-".to_string())}
                    </span>
                </p>
                <p>"Rainfall correlation: "
                    <span id="rainCorr">
                        {move || results.get().map(|r| r.rain_corr).unwrap_or_else(|| "-".to_string())}
                    </span>
                </p>
            </section>
        </main>
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    leptos::mount_to_body(|| view! { <App/> });
}
