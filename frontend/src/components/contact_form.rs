use log::{info, warn};
use thiserror::Error;
use web_sys::{window, FormData, HtmlFormElement};
use yew::prelude::*;

use crate::config;

const SUBJECT_PREFIX: &str = "【ルミライズ相談】";
const NOT_PROVIDED: &str = "（未記入）";
const REQUIRED_MESSAGE: &str = "「相談内容」と「お問い合わせ内容」は必須です。";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InquiryError {
    #[error("consultation type is required")]
    MissingCategory,
    #[error("message is required")]
    MissingMessage,
}

/// Trimmed contact form values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inquiry {
    pub name: String,
    pub email: String,
    pub tel: String,
    pub category: String,
    pub message: String,
}

fn or_placeholder(value: &str) -> &str {
    if value.is_empty() {
        NOT_PROVIDED
    } else {
        value
    }
}

impl Inquiry {
    pub fn new(name: &str, email: &str, tel: &str, category: &str, message: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            tel: tel.trim().to_string(),
            category: category.trim().to_string(),
            message: message.trim().to_string(),
        }
    }

    pub fn from_form(form: &HtmlFormElement) -> Self {
        let data = FormData::new_with_form(form).ok();
        let field = |name: &str| {
            data.as_ref()
                .and_then(|d| d.get(name).as_string())
                .unwrap_or_default()
        };
        Self::new(
            &field("name"),
            &field("email"),
            &field("tel"),
            &field("type"),
            &field("message"),
        )
    }

    pub fn validate(&self) -> Result<(), InquiryError> {
        if self.category.is_empty() {
            return Err(InquiryError::MissingCategory);
        }
        if self.message.is_empty() {
            return Err(InquiryError::MissingMessage);
        }
        Ok(())
    }

    pub fn subject(&self) -> String {
        let mut subject = format!("{}{}", SUBJECT_PREFIX, self.category);
        if !self.name.is_empty() {
            subject.push_str(" / ");
            subject.push_str(&self.name);
        }
        subject
    }

    pub fn body(&self) -> String {
        format!(
            "相談内容：{}\nお名前：{}\nメール：{}\n電話：{}\n\nお問い合わせ内容：\n{}\n",
            self.category,
            or_placeholder(&self.name),
            or_placeholder(&self.email),
            or_placeholder(&self.tel),
            self.message,
        )
    }

    pub fn mailto(&self, recipient: &str) -> Result<String, InquiryError> {
        self.validate()?;
        Ok(format!(
            "mailto:{}?subject={}&body={}",
            recipient,
            urlencoding::encode(&self.subject()),
            urlencoding::encode(&self.body()),
        ))
    }
}

#[function_component(ContactForm)]
pub fn contact_form() -> Html {
    let onsubmit = Callback::from(move |e: SubmitEvent| {
        e.prevent_default();
        let Some(form) = e.target_dyn_into::<HtmlFormElement>() else {
            return;
        };
        let Some(window) = window() else {
            return;
        };
        match Inquiry::from_form(&form).mailto(config::CONTACT_RECIPIENT) {
            Ok(href) => {
                info!("opening mail client for inquiry");
                if let Err(err) = window.location().set_href(&href) {
                    warn!("could not open mail client: {:?}", err);
                }
            }
            Err(err) => {
                info!("inquiry not sent: {}", err);
                let _ = window.alert_with_message(REQUIRED_MESSAGE);
            }
        }
    });

    html! {
        <form id="contactForm" class="contact__form" {onsubmit}>
            <label class="field">
                <span class="field__label">{"お名前"}</span>
                <input type="text" name="name" autocomplete="name" />
            </label>
            <label class="field">
                <span class="field__label">{"メールアドレス"}</span>
                <input type="email" name="email" autocomplete="email" />
            </label>
            <label class="field">
                <span class="field__label">{"電話番号"}</span>
                <input type="tel" name="tel" autocomplete="tel" />
            </label>
            <label class="field">
                <span class="field__label">{"相談内容"}<em>{"必須"}</em></span>
                <select name="type">
                    <option value="">{"選択してください"}</option>
                    <option value="ブランディング">{"ブランディング"}</option>
                    <option value="Web制作">{"Web制作"}</option>
                    <option value="撮影・映像">{"撮影・映像"}</option>
                    <option value="その他">{"その他"}</option>
                </select>
            </label>
            <label class="field field--wide">
                <span class="field__label">{"お問い合わせ内容"}<em>{"必須"}</em></span>
                <textarea name="message" rows="6"></textarea>
            </label>
            <button type="submit" class="btn btn--primary">{"メールで相談する"}</button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(encoded: &str) -> String {
        urlencoding::decode(encoded).unwrap().into_owned()
    }

    fn params(href: &str) -> (String, String) {
        let query = href.split_once('?').unwrap().1;
        let (subject, body) = query.split_once("&body=").unwrap();
        (
            subject.trim_start_matches("subject=").to_string(),
            body.to_string(),
        )
    }

    #[test]
    fn builds_mailto_with_placeholders() {
        let inquiry = Inquiry::new("", "", "", "Consultation", "Hello");
        let href = inquiry.mailto(config::CONTACT_RECIPIENT).unwrap();
        assert!(href.starts_with("mailto:info@lumirize.com?subject="));

        let (subject, body) = params(&href);
        assert!(subject.contains("Consultation"));
        assert!(!body.contains(' ') && !body.contains('\n'));

        let body = decode(&body);
        assert!(body.contains("Hello"));
        assert!(body.contains("お名前：（未記入）"));
        assert!(body.contains("メール：（未記入）"));
        assert_eq!(decode(&subject), "【ルミライズ相談】Consultation");
    }

    #[test]
    fn name_goes_into_subject() {
        let inquiry = Inquiry::new(" 山田 ", "a@b.jp", "", "Web制作", "相談です");
        assert_eq!(inquiry.subject(), "【ルミライズ相談】Web制作 / 山田");
        assert!(inquiry.body().contains("メール：a@b.jp"));
        assert!(inquiry.body().contains("電話：（未記入）"));
    }

    #[test]
    fn body_layout() {
        let inquiry = Inquiry::new("A", "a@example.com", "090", "Consultation", "Hi\nthere");
        assert_eq!(
            inquiry.body(),
            "相談内容：Consultation\nお名前：A\nメール：a@example.com\n電話：090\n\nお問い合わせ内容：\nHi\nthere\n"
        );
    }

    #[test]
    fn required_fields() {
        let missing_type = Inquiry::new("A", "", "", "  ", "Hello");
        assert_eq!(
            missing_type.mailto(config::CONTACT_RECIPIENT),
            Err(InquiryError::MissingCategory)
        );
        let missing_message = Inquiry::new("A", "", "", "Consultation", "\n ");
        assert_eq!(
            missing_message.mailto(config::CONTACT_RECIPIENT),
            Err(InquiryError::MissingMessage)
        );
    }

    #[test]
    fn reserved_characters_are_encoded() {
        let inquiry = Inquiry::new("A&B", "", "", "x=y", "50% off?");
        let href = inquiry.mailto(config::CONTACT_RECIPIENT).unwrap();
        let (subject, body) = params(&href);
        assert!(!subject.contains('&') && !subject.contains('='));
        assert_eq!(decode(&subject), "【ルミライズ相談】x=y / A&B");
        assert!(decode(&body).contains("50% off?"));
    }
}
