use std::sync::LazyLock;

use quick_xml::{Reader, events::Event};
use regex::Regex;

use crate::Result;

const TAG_PATTERN: &str = r"<[^>]*>";

static TAG_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(TAG_PATTERN).ok());

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RssEntry {
	pub title: String,
	pub link: String,
	pub pub_date: String,
	pub description: String,
}

/// Reads the `channel/item` entries of an RSS 2.0 document. A document without a channel yields
/// no entries.
pub fn parse_rss(xml: &str) -> Result<Vec<RssEntry>> {
	let mut reader = Reader::from_str(xml);

	reader.config_mut().trim_text(true);

	let mut path: Vec<String> = Vec::new();
	let mut current: Option<RssEntry> = None;
	let mut entries = Vec::new();

	loop {
		match reader.read_event()? {
			Event::Start(start) => {
				let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

				if name == "item" && path.last().is_some_and(|parent| parent == "channel") {
					current = Some(RssEntry::default());
				}

				path.push(name);
			},
			Event::End(_) => {
				if path.pop().as_deref() == Some("item")
					&& path.last().is_some_and(|parent| parent == "channel")
					&& let Some(entry) = current.take()
				{
					entries.push(entry);
				}
			},
			Event::Text(text) => {
				let value = text
					.unescape()
					.map(|value| value.into_owned())
					.unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned());

				append_field(current.as_mut(), &path, &value);
			},
			Event::CData(data) => {
				let value = String::from_utf8_lossy(&data.into_inner()).into_owned();

				append_field(current.as_mut(), &path, &value);
			},
			Event::Eof => break,
			_ => {},
		}
	}

	Ok(entries)
}

/// Drops markup and collapses whitespace.
pub fn strip_html(html: &str) -> String {
	let text = match TAG_RE.as_ref() {
		Some(re) => re.replace_all(html, " ").into_owned(),
		None => html.to_string(),
	};

	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn append_field(entry: Option<&mut RssEntry>, path: &[String], value: &str) {
	let Some(entry) = entry else {
		return;
	};
	let [.., parent, field] = path else {
		return;
	};

	if parent != "item" {
		return;
	}

	let target = match field.as_str() {
		"title" => &mut entry.title,
		"link" => &mut entry.link,
		"pubDate" => &mut entry.pub_date,
		"description" => &mut entry.description,
		_ => return,
	};

	target.push_str(value.trim());
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
	<channel>
		<title>Wire politics</title>
		<item>
			<title>Budget passes &amp; markets rally</title>
			<link>https://example.com/news/1</link>
			<pubDate>Tue, 14 Oct 2025 09:30:00 +0900</pubDate>
			<description><![CDATA[<p>The assembly <b>passed</b> the budget.</p>]]></description>
		</item>
		<item>
			<title> Second </title>
			<link>https://example.com/video/2</link>
		</item>
	</channel>
</rss>"#;

	#[test]
	fn parses_channel_items() {
		let entries = parse_rss(SAMPLE).expect("Failed to parse sample feed.");

		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].title, "Budget passes & markets rally");
		assert_eq!(entries[0].link, "https://example.com/news/1");
		assert_eq!(entries[0].pub_date, "Tue, 14 Oct 2025 09:30:00 +0900");
		assert_eq!(entries[0].description, "<p>The assembly <b>passed</b> the budget.</p>");
		assert_eq!(entries[1].title, "Second");
		assert_eq!(entries[1].pub_date, "");
	}

	#[test]
	fn documents_without_channel_have_no_entries() {
		let entries = parse_rss("<feed><item><title>x</title></item></feed>")
			.expect("Failed to parse document.");

		assert!(entries.is_empty());
	}

	#[test]
	fn malformed_documents_are_errors() {
		assert!(parse_rss("<rss><channel><item></channel></rss>").is_err());
	}

	#[test]
	fn strips_markup_from_descriptions() {
		assert_eq!(
			strip_html("<p>The assembly <b>passed</b>\n the budget.</p>"),
			"The assembly passed the budget."
		);
	}

	#[test]
	fn shared_tag_pattern_is_valid() {
		assert!(TAG_RE.is_some());
		assert_eq!(strip_html("<br/>a<br/>"), "a");
		assert_eq!(strip_html("plain  text"), "plain text");
	}
}
