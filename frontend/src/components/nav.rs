use std::rc::Rc;

use log::debug;
use web_sys::{window, Element, KeyboardEvent, MouseEvent};
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::config;
use crate::hooks::use_body_class;
use crate::platform::MediaWatch;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Toggle,
    LinkClicked,
    OutsideClick,
    Escape,
    DesktopBreakpoint,
    PageShow,
}

impl MenuState {
    pub fn apply(self, action: MenuAction) -> Self {
        match (self, action) {
            (MenuState::Closed, MenuAction::Toggle) => MenuState::Open,
            (MenuState::Open, MenuAction::Toggle) => MenuState::Closed,
            _ => MenuState::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        self == MenuState::Open
    }

    pub fn aria_expanded(self) -> &'static str {
        if self.is_open() {
            "true"
        } else {
            "false"
        }
    }
}

impl Reducible for MenuState {
    type Action = MenuAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let next = self.apply(action);
        if next == *self {
            self
        } else {
            debug!("menu {:?} -> {:?} on {:?}", *self, next, action);
            Rc::new(next)
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
}

#[derive(Properties, PartialEq)]
pub struct NavProps {
    pub links: Vec<NavLink>,
}

#[function_component(Nav)]
pub fn nav(props: &NavProps) -> Html {
    let menu = use_reducer_eq(MenuState::default);
    let menu_ref = use_node_ref();

    {
        let menu = menu.dispatcher();
        use_click_away(menu_ref.clone(), move |_: Event| {
            menu.dispatch(MenuAction::OutsideClick)
        });
    }
    {
        let menu = menu.dispatcher();
        use_event_with_window("keydown", move |e: KeyboardEvent| {
            if e.key() == "Escape" {
                menu.dispatch(MenuAction::Escape);
            }
        });
    }
    {
        let menu = menu.dispatcher();
        use_event_with_window("pageshow", move |_: Event| menu.dispatch(MenuAction::PageShow));
    }

    // Crossing into desktop width closes the mobile panel.
    {
        let menu = menu.dispatcher();
        use_effect_with_deps(
            move |_| {
                let watch = window().and_then(|w| {
                    MediaWatch::new(&w, config::DESKTOP_QUERY, move |desktop| {
                        if desktop {
                            menu.dispatch(MenuAction::DesktopBreakpoint);
                        }
                    })
                });
                move || drop(watch)
            },
            (),
        );
    }

    let toggle_menu = {
        let menu = menu.dispatcher();
        Callback::from(move |_: MouseEvent| menu.dispatch(MenuAction::Toggle))
    };

    let on_panel_click = {
        let menu = menu.dispatcher();
        Callback::from(move |e: MouseEvent| {
            let on_link = e
                .target_dyn_into::<Element>()
                .and_then(|target| target.closest("a").ok().flatten())
                .is_some();
            if on_link {
                menu.dispatch(MenuAction::LinkClicked);
            }
        })
    };

    let state = *menu;
    use_body_class("nav-open", state.is_open());

    html! {
        <header class="nav">
            <div class="nav__inner">
                <a href="#top" class="nav__logo">{"LUMIRIZE"}</a>
                <div class="nav__menu" ref={menu_ref}>
                    <button
                        type="button"
                        class={classes!("nav__toggle", state.is_open().then_some("is-open"))}
                        aria-controls="navPanel"
                        aria-expanded={state.aria_expanded()}
                        aria-label="メニュー"
                        onclick={toggle_menu}
                    >
                        <span></span>
                        <span></span>
                        <span></span>
                    </button>
                    <nav
                        id="navPanel"
                        class={classes!("nav__panel", state.is_open().then_some("is-open"))}
                        onclick={on_panel_click}
                    >
                        { for props.links.iter().map(|link| html! {
                            <a class="nav__link" href={link.href}>{link.label}</a>
                        }) }
                    </nav>
                </div>
            </div>
        </header>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOSERS: [MenuAction; 5] = [
        MenuAction::LinkClicked,
        MenuAction::OutsideClick,
        MenuAction::Escape,
        MenuAction::DesktopBreakpoint,
        MenuAction::PageShow,
    ];

    #[test]
    fn trigger_opens_and_sets_aria() {
        let open = MenuState::Closed.apply(MenuAction::Toggle);
        assert_eq!(open, MenuState::Open);
        assert_eq!(open.aria_expanded(), "true");
        assert_eq!(MenuState::Closed.aria_expanded(), "false");
    }

    #[test]
    fn trigger_closes_when_open() {
        assert_eq!(MenuState::Open.apply(MenuAction::Toggle), MenuState::Closed);
    }

    #[test]
    fn every_close_action_closes_open_menu() {
        for action in CLOSERS {
            assert_eq!(MenuState::Open.apply(action), MenuState::Closed, "{:?}", action);
        }
    }

    #[test]
    fn close_actions_are_idempotent() {
        for action in CLOSERS {
            assert_eq!(MenuState::Closed.apply(action), MenuState::Closed, "{:?}", action);
        }
    }

    #[test]
    fn reducer_keeps_identity_when_nothing_changes() {
        let closed = Rc::new(MenuState::Closed);
        let same = closed.clone().reduce(MenuAction::Escape);
        assert!(Rc::ptr_eq(&closed, &same));

        let open = closed.reduce(MenuAction::Toggle);
        assert_eq!(*open, MenuState::Open);
    }
}
