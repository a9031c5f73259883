use crate::config::{AuthConfig, UseAuthOptions};
use crate::hooks::{SharedProviderFactory, init_auth_session, use_auth_session};
use crate::location::{current_url, path_and_query, replace_current_entry};
use crate::provider::{AppState, LoginOptions, LogoutOptions};
use crate::recovery::{ErrorNotice, ErrorRecovery, Reconciliation, StartupCheck};
use crate::session::Session;
use leptos::prelude::*;
use leptos_router::components::{A, Route, Router, Routes};
use leptos_router::hooks::use_navigate;
use leptos_router::path;

/// Initializes the auth session and renders its children.
///
/// Must be rendered inside a `Router`, exactly once.
#[component]
pub fn AuthProvider(
    config: AuthConfig,
    factory: SharedProviderFactory,
    /// Replaces the default navigation after the return leg of a redirect login.
    #[prop(optional)]
    on_redirect_callback: Option<Callback<AppState>>,
    children: Children,
) -> impl IntoView {
    let _auth = init_auth_session(
        UseAuthOptions {
            config,
            on_redirect_callback,
        },
        factory,
    );
    children()
}

/// The complete application: router, auth session and shell.
#[component]
pub fn App(config: AuthConfig, factory: SharedProviderFactory) -> impl IntoView {
    view! {
        <Router>
            <AuthProvider config=config factory=factory>
                <Shell/>
            </AuthProvider>
        </Router>
    }
}

/// What the shell renders for a given session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellView {
    /// Only the loading placeholder.
    Placeholder,

    /// Navigation, routes and the error modal.
    Resolved,
}

impl ShellView {
    pub fn for_session(session: &Session) -> Self {
        if session.loading() {
            ShellView::Placeholder
        } else {
            ShellView::Resolved
        }
    }
}

/// Application shell. Detects provider errors reported in the url the app was started with,
/// presents them and forces a logout once the session is known and the user dismissed the error.
#[component]
pub fn Shell() -> impl IntoView {
    let auth = use_auth_session();
    let recovery = RwSignal::new(ErrorRecovery::default());

    let navigate = use_navigate();
    Effect::new(move |_| {
        let Some(url) = current_url() else {
            return;
        };
        if let Some(StartupCheck::ErrorDetected { cleaned_url }) =
            recovery.try_update(|it| it.check_startup(&url))
        {
            replace_current_entry(&navigate, &path_and_query(&cleaned_url));
        }
    });

    Effect::new(move |_| {
        let loading = auth.loading.get();
        if recovery.with(|it| it.should_force_logout(loading))
            && recovery.try_update(|it| it.reconcile(loading)) == Some(Reconciliation::ForceLogout)
        {
            tracing::debug!("Forcing logout after a provider reported login error");
            auth.spawn_logout(LogoutOptions::default());
        }
    });

    let view_kind = Memo::new(move |_| ShellView::for_session(&auth.session.read()));
    let notice = Signal::derive(move || recovery.with(|it| it.notice().cloned()));
    let on_dismiss = Callback::new(move |()| recovery.update(|it| it.dismiss()));

    move || match view_kind.get() {
        ShellView::Placeholder => view! { <Loading/> }.into_any(),
        ShellView::Resolved => view! {
            <div class="app">
                <NavBar/>
                <main>
                    <Routes fallback=|| view! { <Home/> }>
                        <Route path=path!("/") view=Home/>
                        <Route path=path!("/about") view=About/>
                        <Route path=path!("/users") view=Users/>
                    </Routes>
                </main>
                <ErrorModal notice=notice on_dismiss=on_dismiss/>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn Loading() -> impl IntoView {
    view! { <div class="loading">"Loading..."</div> }
}

pub fn status_text(is_authenticated: Option<bool>) -> &'static str {
    match is_authenticated {
        Some(true) => "Authenticated",
        _ => "Not Authenticated",
    }
}

#[component]
pub fn NavBar() -> impl IntoView {
    let auth = use_auth_session();
    let authenticated = move || auth.is_authenticated.get() == Some(true);
    let greeting = move || {
        auth.user.with(|user| {
            user.as_ref()
                .map(|user| format!("Hello, {}", user.display_name()))
        })
    };

    view! {
        <nav class="navbar">
            <ul class="navbar__links">
                <li><A href="/">"Home"</A></li>
                <li><A href="/about">"About"</A></li>
                <li><A href="/users">"Users"</A></li>
            </ul>
            <span class="navbar__status">{move || status_text(auth.is_authenticated.get())}</span>
            <span class="navbar__greeting">{greeting}</span>
            <Show
                when=authenticated
                fallback=move || view! {
                    <button id="login" on:click=move |_| auth.spawn_login(LoginOptions::default())>
                        "Log in"
                    </button>
                }
            >
                <button id="logout" on:click=move |_| auth.spawn_logout(LogoutOptions::default())>
                    "Log out"
                </button>
            </Show>
        </nav>
    }
}

/// Presents a provider reported login error.
///
/// Always part of the DOM. Hidden while `notice` is `None`.
#[component]
pub fn ErrorModal(
    #[prop(into)] notice: Signal<Option<ErrorNotice>>,
    on_dismiss: Callback<()>,
) -> impl IntoView {
    let visible = move || notice.with(Option::is_some);
    let title = move || notice.with(|it| it.as_ref().map(|it| it.title.clone()));
    let message = move || notice.with(|it| it.as_ref().map(|it| it.message.clone()));

    view! {
        <div
            class="error-modal__backdrop"
            role="dialog"
            aria-modal="true"
            aria-hidden=move || (!visible()).to_string()
            style:display=move || if visible() { "flex" } else { "none" }
        >
            <div class="error-modal">
                <h2 class="error-modal__title">{title}</h2>
                <p class="error-modal__message">{message}</p>
                <button id="dismiss" on:click=move |_| on_dismiss.run(())>"Close"</button>
            </div>
        </div>
    }
}

#[component]
pub fn Home() -> impl IntoView {
    view! { <h1>"Home"</h1> }
}

#[component]
pub fn About() -> impl IntoView {
    view! { <h1>"About"</h1> }
}

#[component]
pub fn Users() -> impl IntoView {
    let auth = use_auth_session();
    view! {
        <h1>"Users"</h1>
        {move || auth.user.get().map(|user| view! {
            <p class="users__current">{user.display_name().to_owned()}</p>
        })}
    }
}
