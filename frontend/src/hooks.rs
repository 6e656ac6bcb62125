use web_sys::window;
use yew::prelude::*;

/// Mirrors `active` as a class on `<body>`.
#[hook]
pub fn use_body_class(class: &'static str, active: bool) {
    use_effect_with_deps(
        move |active| {
            if let Some(body) = window().and_then(|w| w.document()).and_then(|d| d.body()) {
                let _ = body.class_list().toggle_with_force(class, *active);
            }
            || ()
        },
        active,
    );
}
