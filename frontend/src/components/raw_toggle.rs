use web_sys::MouseEvent;
use yew::prelude::*;

use crate::config;
use crate::hooks::use_body_class;
use crate::platform::storage::{load_flag, save_flag, LocalFlagStore};

/// Persisted "raw mode" switch. Storage problems only cost persistence;
/// the toggle keeps working for the session.
#[function_component(RawModeToggle)]
pub fn raw_mode_toggle() -> Html {
    let raw = use_state_eq(|| load_flag(&LocalFlagStore, config::RAW_MODE_STORAGE_KEY));
    use_body_class("is-raw", *raw);

    let onclick = {
        let raw = raw.clone();
        Callback::from(move |_: MouseEvent| {
            let next = !*raw;
            save_flag(&LocalFlagStore, config::RAW_MODE_STORAGE_KEY, next);
            raw.set(next);
        })
    };

    html! {
        <button
            type="button"
            class={classes!("rawToggle", (*raw).then_some("is-on"))}
            aria-pressed={if *raw { "true" } else { "false" }}
            {onclick}
        >
            {"RAW"}
        </button>
    }
}
