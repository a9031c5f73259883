use crate::provider::AppState;
use leptos_router::NavigateOptions;
use url::Url;

/// Query parameters consumed by the return leg of a redirect login.
const REDIRECT_CALLBACK_PARAMS: [&str; 2] = ["code", "state"];

/// The full url currently shown in the browser's address bar.
///
/// Returns `None` when not running in a browser or when the location can not be read.
pub fn current_url() -> Option<Url> {
    let href = leptos::prelude::window().location().href().ok()?;
    match Url::parse(&href) {
        Ok(url) => Some(url),
        Err(err) => {
            tracing::error!(?err, %href, "Could not parse current location.");
            None
        }
    }
}

/// Origin of `url` (scheme, host and port) as a url with an empty path.
pub fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}

/// `url` without any query parameters.
pub fn strip_query(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_query(None);
    stripped
}

/// `url` without the query parameters named in `names`. Other parameters are kept in order.
pub fn strip_params(url: &Url, names: &[&str]) -> Url {
    let kept = url
        .query_pairs()
        .filter(|(key, _)| {
            let key: &str = key;
            !names.contains(&key)
        })
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect::<Vec<_>>();

    let mut stripped = url.clone();
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(kept);
    }
    stripped
}

/// Path, query and fragment of `url`, suitable for in-app navigation.
pub fn path_and_query(url: &Url) -> String {
    let mut target = url.path().to_owned();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        target.push('#');
        target.push_str(fragment);
    }
    target
}

/// Where the application should land after the return leg of a redirect login was processed.
///
/// This is the `target_url` of the `app_state` if one was attached to the login request.
/// Otherwise, it is the current location without the `code` and `state` parameters.
pub fn redirect_target(current: &Url, app_state: &AppState) -> String {
    match app_state.target_url.as_deref() {
        Some(target_url) if !target_url.is_empty() => target_url.to_owned(),
        _ => path_and_query(&strip_params(current, &REDIRECT_CALLBACK_PARAMS)),
    }
}

/// Replaces the current history entry with `target` without reloading the page.
pub fn replace_current_entry(navigate: &impl Fn(&str, NavigateOptions), target: &str) {
    tracing::trace!(to = target, "Replacing current location");
    navigate(
        target,
        NavigateOptions {
            replace: true,
            ..Default::default()
        },
    );
}
