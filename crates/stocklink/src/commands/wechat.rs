//! Pushed WeChat message lookup.

use stocklink_core::{AppContext, NewsDigest, StockPush, WechatMessage, WechatNewsItem};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

fn stock_detail(p: &StockPush, color: bool) -> String {
    let mut lines = vec![
        format!(
            "{}  {}",
            output::heading(&format!("{} {}", p.stock_id, p.stock_name), color),
            p.date
        ),
        p.title.clone(),
    ];
    if let Some(ref eval) = p.evaluation {
        lines.push(format!("Evaluation: {eval}"));
    }
    lines.push(String::new());
    lines.push(p.content.clone());
    if let Some(ref reason) = p.reason {
        lines.push(String::new());
        lines.push(format!("Reason: {reason}"));
    }
    if let Some(ref link) = p.link {
        lines.push(output::muted(link, color));
    }
    lines.join("\n")
}

fn digest_detail(d: &NewsDigest, color: bool) -> String {
    let sections: [(&str, &[WechatNewsItem]); 4] = [
        ("Top news", &d.top_news),
        ("HK / US", &d.hk_us_news),
        ("Good news", &d.good_news),
        ("Bad news", &d.bad_news),
    ];
    let mut lines = vec![output::heading(&format!("Digest {}", d.date), color)];
    for (title, items) in sections.iter().filter(|(_, items)| !items.is_empty()) {
        lines.push(String::new());
        lines.push(output::heading(title, color));
        for item in *items {
            let tag = item
                .evaluation
                .as_deref()
                .or(item.sector.as_deref())
                .map(|t| format!(" [{t}]"))
                .unwrap_or_default();
            lines.push(format!("  - {}{tag}", util::truncate(&item.title, 60)));
        }
    }
    lines.join("\n")
}

pub async fn handle(ctx: &AppContext, msgid: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let message = ctx.store().fetch_wechat_message(msgid).await;
    if message.is_empty() {
        return Err(CliError::NoData {
            what: format!("message {msgid}"),
        });
    }

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &message,
        |m| match m {
            WechatMessage::Stock(p) => stock_detail(p, color),
            WechatMessage::Digest(d) => digest_detail(d, color),
        },
        |m| match m {
            WechatMessage::Stock(p) => p.stock_id.clone(),
            WechatMessage::Digest(d) => d.date.clone(),
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
