use yew::prelude::*;
use yew_router::prelude::*;

use crate::config::FeedConfig;
use crate::pages::{NotFound, RecentActions};

#[derive(Debug, Clone, PartialEq, Routable)]
pub enum Route {
    #[at("/users/:uuid")]
    User { uuid: String },
    #[at("/")]
    Home,
    #[not_found]
    #[at("/404")]
    NotFound,
}

/// The feed a route shows, if any. Feeds for different subjects get different configs.
fn feed_config(route: &Route) -> Option<FeedConfig> {
    match route {
        Route::User { uuid } => Some(FeedConfig::for_subject(uuid.clone())),
        Route::Home => Some(FeedConfig::default()),
        Route::NotFound => None,
    }
}

pub fn switch(selected_route: Route) -> Html {
    match feed_config(&selected_route) {
        Some(config) => {
            // Remount per subject so each gets its own fetch.
            let key = config.subject_id.clone();
            html! { <RecentActions key={key} {config} /> }
        }
        None => html! { <NotFound /> },
    }
}
