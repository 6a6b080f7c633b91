use std::{cell::Cell, rc::Rc};

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::{
    config::FeedConfig,
    services::{load_feed, HttpActivityFetcher},
    types::FeedState,
};

/// Loads the feed once on mount, and again only if the config changes.
#[hook]
pub fn use_activity_feed(config: FeedConfig) -> UseStateHandle<FeedState> {
    let feed = use_state(FeedState::default);

    {
        let feed = feed.clone();
        use_effect_with_deps(
            move |config: &FeedConfig| {
                let config = config.clone();
                // Cleared on unmount so a late response can't write into a dead component.
                let alive = Rc::new(Cell::new(true));

                {
                    let alive = alive.clone();
                    spawn_local(async move {
                        let loaded = load_feed(&HttpActivityFetcher::default(), &config).await;
                        if alive.get() {
                            feed.set(loaded);
                        } else {
                            log::debug!("fetch: discarded, unmounted");
                        }
                    });
                }

                move || alive.set(false)
            },
            config,
        );
    }

    feed
}
