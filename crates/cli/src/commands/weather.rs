use super::WeatherArgs;
use crate::output::Output;
use anyhow::Result;
use folio_client::{FetchOptions, FocusEvent, ResourceManager, WeatherView, WeatherWidget};
use folio_core::AppConfig;
use std::time::Duration;

pub async fn run(args: WeatherArgs, config: &AppConfig, manager: &ResourceManager, output: &Output) -> Result<()> {
    let mut options = FetchOptions::from_config(config);
    if let Some(ms) = args.poll_ms {
        options = options.poll_interval(Duration::from_millis(ms));
    }

    let mut config = config.clone();
    if let Some(city) = args.city.filter(|c| !c.trim().is_empty()) {
        config.weather.default_city = city;
    }

    let widget = WeatherWidget::with_options(manager, &config, options)?;

    let mut changes = widget.watch();
    changes.wait_for(|state| !state.loading).await?;
    output.weather(widget.city(), &widget.view());

    if !args.watch {
        return Ok(());
    }

    let mut focus = args.focus_every.filter(|secs| *secs > 0).map(|secs| {
        let period = Duration::from_secs(secs);
        tokio::time::interval_at(tokio::time::Instant::now() + period, period)
    });

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = widget.view();
                if !matches!(view, WeatherView::Loading) {
                    output.weather(widget.city(), &view);
                }
            }
            _ = tick(&mut focus) => {
                let notified = manager.notify_focus(FocusEvent::Focus);
                tracing::debug!(notified, "focus event dispatched");
            }
        }
    }

    Ok(())
}

async fn tick(interval: &mut Option<tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
