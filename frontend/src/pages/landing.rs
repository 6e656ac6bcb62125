use log::{info, warn};
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::components::contact_form::ContactForm;
use crate::components::nav::{Nav, NavLink};
use crate::components::raw_toggle::RawModeToggle;
use crate::config;
use crate::effects::PageBehaviors;

const SCENES: &[(&str, &str, &str, &str)] = &[
    (
        "1",
        "/assets/scene-1.jpg",
        "光を見つける",
        "ブランドの中にすでにある光を、対話を通して一緒に探します。",
    ),
    (
        "2",
        "/assets/scene-2.jpg",
        "かたちにする",
        "言葉、写真、Webサイト。見つけた光を伝わるかたちに整えます。",
    ),
    (
        "3",
        "/assets/scene-3.jpg",
        "届ける",
        "届けたい人に届くまで、公開後の運用まで伴走します。",
    ),
];

const SERVICES: &[(&str, &str)] = &[
    ("ブランディング", "理念やストーリーを整理し、ぶれない軸をつくります。"),
    ("Web制作", "想いが伝わるサイトを、更新しやすい仕組みで。"),
    ("撮影・映像", "人柄や空気感まで写しとる写真と映像。"),
];

fn nav_links() -> Vec<NavLink> {
    vec![
        NavLink { href: "#about", label: "私たちについて" },
        NavLink { href: "#story", label: "ストーリー" },
        NavLink { href: "#services", label: "サービス" },
        NavLink { href: "#contact", label: "お問い合わせ" },
    ]
}

fn debug_enabled(param: Option<&str>) -> bool {
    matches!(param, Some(value) if value != "0")
}

#[function_component(Landing)]
pub fn landing() -> Html {
    let debug_param = use_search_param(config::DEBUG_QUERY_PARAM.to_string());
    let debug = debug_enabled(debug_param.as_deref());

    // Behaviors attach to the rendered markup, so they install after mount.
    {
        use_effect_with_deps(
            move |debug| {
                let behaviors = match PageBehaviors::install(*debug) {
                    Ok(behaviors) => {
                        info!("page behaviors installed");
                        Some(behaviors)
                    }
                    Err(err) => {
                        warn!("page behaviors unavailable: {}", err);
                        None
                    }
                };
                move || drop(behaviors)
            },
            debug,
        );
    }

    html! {
        <div class="landing" id="top">
            <style>{LANDING_CSS}</style>
            <Nav links={nav_links()} />

            <header class="hero">
                <div class="hero__bg" data-parallax="true"></div>
                <div class="hero__content">
                    <p class="hero__eyebrow reveal">{"LUMIRIZE"}</p>
                    <h1 class="hero__title reveal">{"あなたの中の光を、まっすぐ届ける。"}</h1>
                    <a href="#contact" class="btn btn--primary reveal">{"相談してみる"}</a>
                </div>
            </header>

            <section id="about" class="section about">
                <h2 class="section__title reveal">{"私たちについて"}</h2>
                <p class="reveal">
                    {"ルミライズは、小さなお店や個人事業主のためのクリエイティブチームです。"}
                </p>
                <p class="reveal">
                    {"派手さよりも、その人らしさを。長く愛されるブランドづくりをお手伝いします。"}
                </p>
            </section>

            <section id="story" class="cinematic" data-active-scene="1">
                <div class="cinematic__sticky">
                    <div class="cinematic__media">
                        { for SCENES.iter().map(|(id, src, title, _)| html! {
                            <img class="cinematic__img" data-scene={*id} src={*src} alt={*title} loading="lazy" />
                        }) }
                    </div>
                    <div class="cinematic__text">
                        { for SCENES.iter().map(|(id, _, title, copy)| html! {
                            <article class="cinematic__block" data-scene={*id}>
                                <h3>{*title}</h3>
                                <p>{*copy}</p>
                            </article>
                        }) }
                    </div>
                </div>
            </section>

            <section id="services" class="section services">
                <h2 class="section__title reveal">{"サービス"}</h2>
                <div class="services__grid">
                    { for SERVICES.iter().map(|(name, copy)| html! {
                        <div class="card reveal">
                            <h3>{*name}</h3>
                            <p>{*copy}</p>
                        </div>
                    }) }
                </div>
            </section>

            <section id="contact" class="section contact">
                <h2 class="section__title reveal">{"お問い合わせ"}</h2>
                <p class="reveal">{"送信するとメールソフトが開きます。内容を確認して送ってください。"}</p>
                <ContactForm />
            </section>

            <footer class="footer">
                <small>{"© Lumirize"}</small>
                <RawModeToggle />
            </footer>

            <button type="button" class="toTop" aria-label="ページの先頭へ">{"↑"}</button>
        </div>
    }
}

const LANDING_CSS: &str = r#"
    .nav { position: fixed; top: 0; left: 0; right: 0; z-index: 50; }
    .nav__inner { display: flex; justify-content: space-between; align-items: center; padding: 16px 24px; }
    .nav__toggle { display: none; }
    .nav__panel { display: flex; gap: 24px; }
    @media (max-width: 899px) {
        .nav__toggle { display: block; }
        .nav__panel { display: none; position: absolute; top: 64px; left: 0; right: 0; flex-direction: column; padding: 24px; background: #fff; }
        .nav__panel.is-open { display: flex; }
        body.nav-open { overflow: hidden; }
    }

    .hero { position: relative; min-height: 100vh; overflow: hidden; display: grid; place-items: center; }
    .hero__bg { position: absolute; inset: -4% 0; background: url(/assets/hero.jpg) center / cover; will-change: transform; }
    .hero__content { position: relative; text-align: center; }

    .reveal { opacity: 0; transform: translateY(16px); transition: opacity .8s ease, transform .8s ease; }
    .reveal.is-in { opacity: 1; transform: none; }

    .cinematic { position: relative; height: 300vh; }
    .cinematic__sticky { position: sticky; top: 0; height: 100vh; display: grid; grid-template-columns: 1fr 1fr; align-items: center; }
    .cinematic__media { position: relative; height: 100%; }
    .cinematic__img { position: absolute; inset: 0; width: 100%; height: 100%; object-fit: cover; opacity: 0; transition: opacity .9s ease; }
    .cinematic__img.is-active { opacity: 1; }
    .cinematic__text { position: relative; }
    .cinematic__block { position: absolute; inset: 0; opacity: 0; transform: translateY(12px); transition: opacity .6s ease, transform .6s ease; }
    .cinematic__block.is-active { position: relative; opacity: 1; transform: none; }

    .toTop { position: fixed; right: 16px; bottom: 16px; opacity: 0; pointer-events: none; transition: opacity .3s; }
    .toTop.is-show { opacity: 1; pointer-events: auto; }

    body.is-raw .reveal, body.is-raw .cinematic__img, body.is-raw .cinematic__block { transition: none; }
    body.is-raw .hero__bg { filter: none; }

    @media (prefers-reduced-motion: reduce) {
        .reveal, .cinematic__img, .cinematic__block { transition: none; }
    }
"#;
