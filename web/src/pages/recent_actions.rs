use yew::prelude::*;

use crate::{config::FeedConfig, hooks::use_activity_feed, shared::ActivityItems};

#[derive(Properties, Clone, PartialEq, Eq)]
pub struct Props {
    pub config: FeedConfig,
}

#[function_component(RecentActions)]
pub fn recent_actions(props: &Props) -> Html {
    let feed = use_activity_feed(props.config.clone());
    let rows = feed.rows(&props.config);

    html! {
        <div>
            <h1>{ "Recent Actions" }</h1>
            <ActivityItems {rows} />
        </div>
    }
}
