/// History viewer page: toolbar, search and the mind-map tree
use crate::grouping::{GroupMode, SortDirection, SortKey};
use crate::history::{ChromeHistory, extension_id, fetch_all, open_in_new_tab};
use crate::i18n::Language;
use crate::operations::delete_subtree;
use crate::state::{ViewerAction, ViewerState};
use crate::storage::{load_preferences, save_preferences};
use crate::ui::components::{TreeView, node_dom_id, render_tree};
use patternfly_yew::prelude::*;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

const DARK_THEME_CLASS: &str = "dark-theme";

impl Reducible for ViewerState {
    type Action = ViewerAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = Rc::unwrap_or_clone(self);
        next.apply(action);
        Rc::new(next)
    }
}

#[derive(Clone, PartialEq)]
enum ViewState {
    Loading,
    Idle,
    Deleting,
    Error(String),
}

fn browser_language() -> Language {
    web_sys::window()
        .and_then(|w| w.navigator().language())
        .map(|tag| Language::detect(&tag))
        .unwrap_or_default()
}

fn document() -> Option<web_sys::Document> {
    web_sys::window().and_then(|w| w.document())
}

/// Fetch every record and hand it to the reducer
async fn reload(viewer: UseReducerDispatcher<ViewerState>, status: UseStateHandle<ViewState>) {
    match fetch_all(&ChromeHistory, js_sys::Date::now()).await {
        Ok(records) => {
            viewer.dispatch(ViewerAction::RecordsLoaded(records));
            status.set(ViewState::Idle);
        }
        Err(e) => {
            log::error!("Failed to load history: {}", e);
            status.set(ViewState::Error(e.to_string()));
        }
    }
}

#[function_component(HistoryViewer)]
pub fn history_viewer() -> Html {
    let viewer = use_reducer(|| ViewerState::new(browser_language()));
    let status = use_state(|| ViewState::Loading);
    let prefs_ready = use_state(|| false);
    let search_input = use_state(String::new);
    let extension_id = use_memo((), |_| extension_id());

    let locale = viewer.locale();
    let mode = viewer.prefs.group_by;

    // Load preferences, then the full history, once on mount
    {
        let dispatcher = viewer.dispatcher();
        let status = status.clone();
        let prefs_ready = prefs_ready.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_preferences().await {
                    Ok(prefs) => dispatcher.dispatch(ViewerAction::PreferencesLoaded(prefs)),
                    Err(e) => log::warn!("Using default preferences: {}", e),
                }
                prefs_ready.set(true);
                reload(dispatcher, status).await;
            });
            || ()
        });
    }

    // Persist preferences after the stored ones have been read
    {
        let prefs = viewer.prefs.clone();
        use_effect_with((prefs, *prefs_ready), |(prefs, ready)| {
            if *ready {
                let prefs = prefs.clone();
                spawn_local(async move {
                    if let Err(e) = save_preferences(&prefs).await {
                        log::warn!("Failed to save preferences: {}", e);
                    }
                });
            }
            || ()
        });
    }

    // Theme class on <body>
    {
        let dark = viewer.prefs.theme.is_dark();
        use_effect_with(dark, |dark| {
            if let Some(body) = document().and_then(|d| d.body()) {
                if let Err(e) = body.class_list().toggle_with_force(DARK_THEME_CLASS, *dark) {
                    log::warn!("Failed to switch theme: {:?}", e);
                }
            }
            || ()
        });
    }

    // Page title follows the language
    {
        let title = locale.t("title");
        use_effect_with(title, |title| {
            if let Some(doc) = document() {
                doc.set_title(title);
            }
            || ()
        });
    }

    // Scroll the focused match into view
    {
        let focused = viewer.search.focused().map(str::to_string);
        use_effect_with(focused, |focused| {
            if let Some(id) = focused {
                if let Some(el) = document().and_then(|d| d.get_element_by_id(&node_dom_id(id))) {
                    el.scroll_into_view();
                }
            }
            || ()
        });
    }

    let on_group_change = {
        let viewer = viewer.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                if let Some(mode) = GroupMode::parse(&select.value()) {
                    viewer.dispatch(ViewerAction::SetGroupMode(mode));
                }
            }
        })
    };

    let on_sort_change = {
        let viewer = viewer.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                if let Some(key) = SortKey::parse(&select.value()) {
                    viewer.dispatch(ViewerAction::SetSortKey(key));
                }
            }
        })
    };

    let on_sort_direction = {
        let viewer = viewer.clone();
        Callback::from(move |_: MouseEvent| viewer.dispatch(ViewerAction::ToggleSortDirection))
    };

    let on_language_change = {
        let viewer = viewer.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                if let Some(language) = Language::parse(&select.value()) {
                    viewer.dispatch(ViewerAction::SetLanguage(language));
                }
            }
        })
    };

    let on_theme_toggle = {
        let viewer = viewer.clone();
        Callback::from(move |_: MouseEvent| viewer.dispatch(ViewerAction::ToggleTheme))
    };

    let on_search_input = {
        let search_input = search_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                search_input.set(input.value());
            }
        })
    };

    let on_search_keypress = {
        let viewer = viewer.clone();
        let search_input = search_input.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                viewer.dispatch(ViewerAction::Search((*search_input).clone()));
            }
        })
    };

    let on_search = {
        let viewer = viewer.clone();
        let search_input = search_input.clone();
        Callback::from(move |_: MouseEvent| viewer.dispatch(ViewerAction::Search((*search_input).clone())))
    };

    let on_prev = {
        let viewer = viewer.clone();
        Callback::from(move |_: MouseEvent| viewer.dispatch(ViewerAction::PrevMatch))
    };

    let on_next = {
        let viewer = viewer.clone();
        Callback::from(move |_: MouseEvent| viewer.dispatch(ViewerAction::NextMatch))
    };

    let on_toggle = {
        let viewer = viewer.clone();
        Callback::from(move |id: String| viewer.dispatch(ViewerAction::Toggle(id)))
    };

    let on_activate = Callback::from(|url: String| {
        spawn_local(async move {
            if let Err(e) = open_in_new_tab(&url).await {
                log::error!("{}", e);
            }
        });
    });

    let on_delete = {
        let viewer = viewer.clone();
        let status = status.clone();
        Callback::from(move |id: String| {
            if *status == ViewState::Deleting {
                return;
            }
            let Some(window) = web_sys::window() else {
                return;
            };
            if !window.confirm_with_message(&locale.t("confirmDelete")).unwrap_or(false) {
                return;
            }
            let Some(node) = viewer.tree.as_ref().and_then(|tree| tree.find(&id)).cloned() else {
                return;
            };

            let dispatcher = viewer.dispatcher();
            let status = status.clone();
            let delete_error = locale.t("deleteError");
            status.set(ViewState::Deleting);
            spawn_local(async move {
                match delete_subtree(&ChromeHistory, &node).await {
                    Ok(_) => dispatcher.dispatch(ViewerAction::NodeDeleted(id)),
                    Err(e) => {
                        log::error!("{}", e);
                        if let Err(e) = window.alert_with_message(&delete_error) {
                            log::warn!("Failed to show alert: {:?}", e);
                        }
                    }
                }
                // Resync with the browser whatever the outcome
                reload(dispatcher, status).await;
            });
        })
    };

    let busy = matches!(*status, ViewState::Loading | ViewState::Deleting);
    let sort_arrow = match viewer.prefs.sort_direction {
        SortDirection::Asc => "↑",
        SortDirection::Desc => "↓",
    };
    let sort_title = match viewer.prefs.sort_direction {
        SortDirection::Asc => locale.t("sortAsc"),
        SortDirection::Desc => locale.t("sortDesc"),
    };
    let current_language = viewer.prefs.language_or(viewer.detected_language);

    let tree_view = TreeView {
        extension_id: extension_id.as_str(),
        search: &viewer.search,
        on_toggle,
        on_activate,
        on_delete,
    };

    html! {
        <div class="history-viewer">
            <header class="toolbar">
                <h1>{locale.t("title")}</h1>

                <select class="group-by" onchange={on_group_change}>
                    <option value={GroupMode::Domain.as_str()} selected={mode == GroupMode::Domain}>
                        {locale.t("groupByDomain")}
                    </option>
                    <option value={GroupMode::Date.as_str()} selected={mode == GroupMode::Date}>
                        {locale.t("groupByDate")}
                    </option>
                </select>

                if mode == GroupMode::Domain {
                    <div class="sort-controls">
                        <select class="sort-by" onchange={on_sort_change}>
                            <option value={SortKey::Name.as_str()} selected={viewer.prefs.sort_key == SortKey::Name}>
                                {locale.t("sortByName")}
                            </option>
                            <option value={SortKey::Count.as_str()} selected={viewer.prefs.sort_key == SortKey::Count}>
                                {locale.t("sortByCount")}
                            </option>
                        </select>
                        <span class="sort-direction" title={sort_title}>
                            <Button onclick={on_sort_direction} variant={ButtonVariant::Secondary}>
                                {sort_arrow}
                            </Button>
                        </span>
                    </div>
                }

                <label class="language-select">
                    {locale.t("language")}
                    <select onchange={on_language_change}>
                        {for Language::ALL.iter().map(|language| html! {
                            <option value={language.code()} selected={*language == current_language}>
                                {language.native_name()}
                            </option>
                        })}
                    </select>
                </label>

                <Button onclick={on_theme_toggle} variant={ButtonVariant::Secondary}>
                    {locale.t("toggleTheme")}
                </Button>

                <div class="search-container">
                    <input
                        type="text"
                        class="search-input"
                        placeholder={locale.t("searchPlaceholder")}
                        value={(*search_input).clone()}
                        oninput={on_search_input}
                        onkeypress={on_search_keypress}
                    />
                    <Button onclick={on_search} variant={ButtonVariant::Primary}>
                        {locale.t("searchButton")}
                    </Button>
                    <Button onclick={on_prev} variant={ButtonVariant::Secondary} disabled={viewer.search.matches.is_empty()}>
                        {locale.t("prevMatch")}
                    </Button>
                    <Button onclick={on_next} variant={ButtonVariant::Secondary} disabled={viewer.search.matches.is_empty()}>
                        {locale.t("nextMatch")}
                    </Button>
                    if !viewer.search.query.trim().is_empty() {
                        <span class="search-info">{viewer.search.info(&locale)}</span>
                    }
                </div>
            </header>

            if busy {
                <div class="loading">
                    <Spinner />
                    if *status == ViewState::Loading {
                        <span>{locale.t("loading")}</span>
                    }
                </div>
            }

            <main id="tree-view" class="tree-view">
                {
                    match (&*status, viewer.visible_tree()) {
                        (ViewState::Error(err), _) => html! {
                            <Alert
                                r#type={AlertType::Danger}
                                title={locale.t_with("loadError", &[("error", err.as_str())])}
                                inline=true
                            />
                        },
                        (_, Some(root)) => render_tree(root, &tree_view),
                        (ViewState::Idle, None) => html! {
                            <p class="empty">{locale.t("empty")}</p>
                        },
                        _ => html! {},
                    }
                }
            </main>
        </div>
    }
}
