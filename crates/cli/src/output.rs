//! Terminal rendering for command results.

use folio_client::{SubmitStatus, WeatherView};
use serde_json::json;

#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn weather(&self, city: &str, view: &WeatherView) {
        if self.json {
            println!("{}", weather_json(city, view));
            return;
        }

        match view {
            WeatherView::Idle => println!("{}: nothing to show", city),
            WeatherView::Loading => println!("{}: loading...", city),
            WeatherView::Error { headline, detail } => {
                println!("{}", headline);
                println!("  {}", detail);
            }
            WeatherView::Ready { report, refreshing, stale_error } => {
                println!("{} {} ({})", report.emoji, report.location, report.country);
                println!("  {}  {}", report.temperature_label(), report.condition);
                println!("  {}", report.feels_like_label());
                println!("  {}  {}  UV {}", report.humidity_label(), report.wind_label(), report.uv);
                if *refreshing {
                    println!("  refreshing...");
                }
                if let Some(err) = stale_error {
                    println!("  last refresh failed: {}", err);
                }
            }
        }
    }

    pub fn submit(&self, status: SubmitStatus, detail: Option<&str>) {
        if self.json {
            let status = match status {
                SubmitStatus::Idle => "idle",
                SubmitStatus::Success => "success",
                SubmitStatus::Error => "error",
            };
            println!("{}", json!({ "status": status, "error": detail }));
            return;
        }

        match status {
            SubmitStatus::Success => println!("Message sent. Thanks for reaching out!"),
            SubmitStatus::Error => println!("Failed to send message: {}", detail.unwrap_or("unknown error")),
            SubmitStatus::Idle => {}
        }
    }

    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", json!({ "error": msg }));
            return;
        }
        eprintln!("error: {}", msg);
    }
}

fn weather_json(city: &str, view: &WeatherView) -> serde_json::Value {
    match view {
        WeatherView::Idle => json!({ "city": city, "status": "idle" }),
        WeatherView::Loading => json!({ "city": city, "status": "loading" }),
        WeatherView::Error { headline, detail } => {
            json!({ "city": city, "status": "error", "headline": headline, "detail": detail })
        }
        WeatherView::Ready { report, refreshing, stale_error } => json!({
            "city": city,
            "status": "ready",
            "report": report,
            "refreshing": refreshing,
            "stale_error": stale_error,
        }),
    }
}
