use crate::domain::model::TicketPurchaseInfo;
use chrono::NaiveDate;
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

static EMAIL: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)(?:チケット|ticket|予約|reservation)[：:\s]*([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})",
        r"([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})",
    ])
});

static PHONE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)(?:チケット|ticket|予約|reservation)[：:\s]*(\d{2,4}[-‐]\d{3,4}[-‐]\d{3,4})",
        r"(?i)(?:連絡|contact|問合|お問い合わせ)[：:\s]*(\d{2,4}[-‐]\d{3,4}[-‐]\d{3,4})",
    ])
});

static URL: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)(?:チケット|ticket|予約|reservation)[：:\s]*(?:URL[：:\s]*)?(https?://[^\s\)]+)",
        r"(?i)(https?://[^\s]*(?:ticket|peatix|eventbrite|eplus|cnplayguide)[^\s]*)",
    ])
});

static PRICE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)(?:チケット|ticket|料金|price)[：:\s]*[¥￥]?\s*(\d{1,2},?\d{3})[円¥]?",
        r"(?i)(?:前売|advance)[：:\s]*[¥￥]?\s*(\d{1,2},?\d{3})[円¥]?",
        r"(?i)(?:当日|door)[：:\s]*[¥￥]?\s*(\d{1,2},?\d{3})[円¥]?",
    ])
});

static SALES_DATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)(?:発売|sale|販売)[：:\s]*(\d{4})[年/-](\d{1,2})[月/-](\d{1,2})[日]?",
        r"(?i)(?:受付|reception)[：:\s]*(\d{4})[年/-](\d{1,2})[月/-](\d{1,2})[日]?",
    ])
});

const SOCIAL_MAIL_DOMAINS: &[&str] = &["facebook", "twitter", "instagram", "youtube"];
const PRICE_RANGE: std::ops::RangeInclusive<u32> = 500..=20000;
const SALES_YEARS: std::ops::RangeInclusive<i32> = 2024..=2030;

/// 去掉 HTML 標籤，只留文字
pub fn strip_html(text: &str) -> String {
    if !text.contains('<') {
        return text.to_string();
    }
    let fragment = Html::parse_fragment(text);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 每個樣式各取第一個符合的擷取群組，依樣式順序排列
fn first_captures<'a>(patterns: &[Regex], text: &'a str) -> Vec<&'a str> {
    patterns
        .iter()
        .filter_map(|re| re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str()))
        .collect()
}

/// 從演出說明文字中取出聯絡方式、售票網址、票價與開賣日；什麼都沒找到回傳 None
pub fn extract_ticket_info(context: &str) -> Option<TicketPurchaseInfo> {
    let text = strip_html(context);
    let mut info = TicketPurchaseInfo::default();

    info.contact_email = first_captures(&EMAIL, &text)
        .into_iter()
        .find(|email| {
            let lower = email.to_lowercase();
            !SOCIAL_MAIL_DOMAINS.iter().any(|domain| lower.contains(domain))
        })
        .map(str::to_string);

    info.contact_phone = first_captures(&PHONE, &text)
        .first()
        .map(|phone| phone.to_string());

    info.url = first_captures(&URL, &text)
        .first()
        .map(|url| url.trim_end_matches(['.', ',', ';', ')']).to_string());

    info.price = first_captures(&PRICE, &text)
        .into_iter()
        .filter_map(|price| price.replace(',', "").parse::<u32>().ok())
        .find(|price| PRICE_RANGE.contains(price));

    info.sales_start = SALES_DATE.iter().find_map(|re| {
        let caps = re.captures(&text)?;
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if !SALES_YEARS.contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    });

    if info.is_empty() {
        None
    } else {
        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>TICKET: <a href=\"https://peatix.com/e/1\">https://peatix.com/e/1</a></p>"),
            "TICKET: https://peatix.com/e/1"
        );
        assert_eq!(strip_html("plain text"), "plain text");
    }

    #[test]
    fn test_extract_full_ticket_info() {
        let context = "予約: ticket@antiknock.example.jp / 問合: 03-1234-5678\n\
                       チケット URL: https://t.livepocket.jp/e/abc).\n\
                       前売 ¥2,500 当日 ¥3,000\n\
                       発売: 2025年10月1日";
        let info = extract_ticket_info(context).unwrap();

        assert_eq!(info.contact_email.as_deref(), Some("ticket@antiknock.example.jp"));
        assert_eq!(info.contact_phone.as_deref(), Some("03-1234-5678"));
        assert_eq!(info.url.as_deref(), Some("https://t.livepocket.jp/e/abc"));
        assert_eq!(info.price, Some(2500));
        assert_eq!(info.sales_start, NaiveDate::from_ymd_opt(2025, 10, 1));
    }

    #[test]
    fn test_social_emails_and_out_of_range_values_ignored() {
        let context = "mail: band@instagram.com price: ¥100 当日 ¥3,500 sale: 2019/01/01";
        let info = extract_ticket_info(context).unwrap();
        assert_eq!(info.contact_email, None);
        assert_eq!(info.price, Some(3500));
        assert_eq!(info.sales_start, None);
    }

    #[test]
    fn test_generic_ticket_url_from_html() {
        let context = "<div>Details <a href=\"#\">https://eplus.jp/sf/detail/123</a></div>";
        let info = extract_ticket_info(context).unwrap();
        assert_eq!(info.url.as_deref(), Some("https://eplus.jp/sf/detail/123"));
    }

    #[test]
    fn test_nothing_found() {
        assert!(extract_ticket_info("Live starts at seven").is_none());
        assert!(extract_ticket_info("").is_none());
    }
}
