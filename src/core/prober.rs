use crate::domain::model::{PageData, ProbeOutcome};
use crate::domain::ports::Prober;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, Client};
use scraper::{Html, Selector};
use std::time::Duration;

const MAX_REDIRECTS: usize = 10;

/// Plain-HTTP prober.
///
/// The deadline passed to [`Prober::probe`] covers connect, headers and the
/// body read. When it fires the in-flight request future is dropped, which
/// closes the connection; nothing else needs releasing.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(user_agent: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder().redirect(redirect::Policy::limited(MAX_REDIRECTS));
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent.to_string());
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn fetch(&self, url: &str) -> std::result::Result<PageData, reqwest::Error> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let resolved = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let text = response.text().await?;
        let (title, body) = if looks_like_html(content_type.as_deref(), &text) {
            extract_page(&text)
        } else {
            tracing::debug!("{} did not return HTML, skipping extraction", url);
            (None, None)
        };

        Ok(PageData {
            status,
            url: resolved,
            title,
            body,
        })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, domain: &str, timeout: Duration) -> ProbeOutcome {
        let url = format!("http://{}", domain);

        match tokio::time::timeout(timeout, self.fetch(&url)).await {
            Ok(Ok(data)) => ProbeOutcome::success(domain, data),
            Ok(Err(e)) => ProbeOutcome::failure(domain, describe_error(&e)),
            Err(_) => ProbeOutcome::failure(
                domain,
                format!("request aborted: no response within {}ms", timeout.as_millis()),
            ),
        }
    }
}

/// Content type says HTML, or the body opens with markup and the content type
/// is absent or anything other than JSON or an image.
fn looks_like_html(content_type: Option<&str>, text: &str) -> bool {
    match content_type {
        Some(ct) if ct.contains("html") => true,
        Some(ct) if ct.contains("json") || ct.starts_with("image/") => false,
        _ => text.trim_start().starts_with('<'),
    }
}

/// Text of the first `<title>` and the first `<body>`, whitespace collapsed.
pub fn extract_page(html: &str) -> (Option<String>, Option<String>) {
    let document = Html::parse_document(html);
    (
        first_text(&document, "title"),
        first_text(&document, "body"),
    )
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    let element = document.select(&selector).next()?;
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Flattens the error and its sources into one line.
fn describe_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}
