use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;

use super::{tag_record, Source};
use crate::error::FetchError;
use crate::posting::RawPosting;

pub const ENDPOINT: &str = "https://weworkremotely.com/remote-jobs.rss";

/// Each `<item>` becomes a map of its child elements. Titles come as
/// `Company: Role` and are split into `company` and `title`.
pub fn parse(xml: &str) -> Result<Vec<RawPosting>, FetchError> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();
    let mut current: Option<RawPosting> = None;
    let mut field: Option<String> = None;
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => current = Some(RawPosting::new()),
                name if current.is_some() && field.is_none() => {
                    field = Some(String::from_utf8_lossy(name).into_owned());
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Text(e)) if field.is_some() => {
                let t = e.unescape().map_err(|e| FetchError::decode("rss text", e))?;
                text.push_str(&t);
            }
            Ok(Event::CData(e)) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"item" => {
                    if let Some(item) = current.take() {
                        items.push(tag_record(split_title(item), Source::WeWorkRemotely));
                    }
                }
                name if field.as_deref().map(str::as_bytes) == Some(name) => {
                    if let (Some(item), Some(key)) = (current.as_mut(), field.take()) {
                        item.insert(key, Value::String(text.trim().to_string()));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(FetchError::decode("rss feed", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(items)
}

fn split_title(mut item: RawPosting) -> RawPosting {
    let split = item
        .get("title")
        .and_then(Value::as_str)
        .and_then(|t| t.split_once(": "))
        .map(|(company, role)| (company.trim().to_string(), role.trim().to_string()));

    if let Some((company, role)) = split {
        item.entry("company")
            .or_insert_with(|| Value::String(company));
        item.insert("title".into(), Value::String(role));
    }
    item
}
