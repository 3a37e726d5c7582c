//! Optional parsing of a `207 Multi-Status` listing into [`DavEntry`] values.
//!
//! The client itself only ever returns the raw document; this is a consumer
//! of those bytes for callers that want structured entries.

use std::borrow::Cow;
use std::io::{BufRead, Cursor};

use anyhow::{Result, anyhow};
use percent_encoding::percent_decode_str;
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::Event;

use crate::webdav::types::DavEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListingElement {
    Multistatus,
    Response,
    Propstat,
    Prop,
    Href,
    Status,
    Displayname,
    Getetag,
    Resourcetype,
    Collection,
    Getcontentlength,
    Getcontenttype,
    Getlastmodified,
    Creationdate,
    Other,
}

fn element_from_bytes(raw: &[u8]) -> ListingElement {
    let local = match raw.iter().position(|b| *b == b':') {
        Some(idx) => &raw[idx + 1..],
        None => raw,
    };

    if local.eq_ignore_ascii_case(b"multistatus") {
        ListingElement::Multistatus
    } else if local.eq_ignore_ascii_case(b"response") {
        ListingElement::Response
    } else if local.eq_ignore_ascii_case(b"propstat") {
        ListingElement::Propstat
    } else if local.eq_ignore_ascii_case(b"prop") {
        ListingElement::Prop
    } else if local.eq_ignore_ascii_case(b"href") {
        ListingElement::Href
    } else if local.eq_ignore_ascii_case(b"status") {
        ListingElement::Status
    } else if local.eq_ignore_ascii_case(b"displayname") {
        ListingElement::Displayname
    } else if local.eq_ignore_ascii_case(b"getetag") {
        ListingElement::Getetag
    } else if local.eq_ignore_ascii_case(b"resourcetype") {
        ListingElement::Resourcetype
    } else if local.eq_ignore_ascii_case(b"collection") {
        ListingElement::Collection
    } else if local.eq_ignore_ascii_case(b"getcontentlength") {
        ListingElement::Getcontentlength
    } else if local.eq_ignore_ascii_case(b"getcontenttype") {
        ListingElement::Getcontenttype
    } else if local.eq_ignore_ascii_case(b"getlastmodified") {
        ListingElement::Getlastmodified
    } else if local.eq_ignore_ascii_case(b"creationdate") {
        ListingElement::Creationdate
    } else {
        ListingElement::Other
    }
}

fn path_ends_with<T: PartialEq>(stack: &[T], needle: &[T]) -> bool {
    stack.len() >= needle.len() && stack[stack.len() - needle.len()..] == needle[..]
}

/// Element stack plus the text collected for the innermost open element.
/// Text is applied on the closing tag, since quick-xml may split it around
/// entity references.
struct ListingParser {
    stack: Vec<ListingElement>,
    text: String,
    current: DavEntry,
    entries: Vec<DavEntry>,
}

impl ListingParser {
    fn new() -> Self {
        Self {
            stack: Vec::with_capacity(16),
            text: String::new(),
            current: DavEntry::default(),
            entries: Vec::new(),
        }
    }

    fn on_start(&mut self, raw: &[u8]) {
        let element = element_from_bytes(raw);
        self.stack.push(element);
        self.text.clear();

        match element {
            ListingElement::Response => self.current = DavEntry::default(),
            ListingElement::Collection
                if self.path_ends_with(&[
                    ListingElement::Prop,
                    ListingElement::Resourcetype,
                    ListingElement::Collection,
                ]) =>
            {
                self.current.is_collection = true;
            }
            _ => {}
        }
    }

    fn on_end(&mut self) {
        self.apply_text();
        if self.stack.pop() == Some(ListingElement::Response) {
            let mut entry = std::mem::take(&mut self.current);
            entry.name = name_from_href(&entry.href);
            self.entries.push(entry);
        }
    }

    fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn apply_text(&mut self) {
        let text = std::mem::take(&mut self.text);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        let value = trimmed.to_string();

        if self.path_ends_with(&[ListingElement::Response, ListingElement::Href]) {
            self.current.href = value;
        } else if self.path_ends_with(&[ListingElement::Response, ListingElement::Status])
            || self.path_ends_with(&[
                ListingElement::Response,
                ListingElement::Propstat,
                ListingElement::Status,
            ])
        {
            if self.current.status.is_none() {
                self.current.status = Some(value);
            }
        } else if self.in_prop(ListingElement::Displayname) {
            self.current.displayname = Some(value);
        } else if self.in_prop(ListingElement::Getetag) {
            self.current.etag = Some(value);
        } else if self.in_prop(ListingElement::Getcontentlength) {
            self.current.content_length = value.parse().ok();
        } else if self.in_prop(ListingElement::Getcontenttype) {
            self.current.content_type = Some(value);
        } else if self.in_prop(ListingElement::Getlastmodified) {
            self.current.last_modified = Some(value);
        } else if self.in_prop(ListingElement::Creationdate) {
            self.current.creation_date = Some(value);
        }
    }

    fn in_prop(&self, element: ListingElement) -> bool {
        self.path_ends_with(&[
            ListingElement::Response,
            ListingElement::Propstat,
            ListingElement::Prop,
            element,
        ])
    }

    fn path_ends_with(&self, needle: &[ListingElement]) -> bool {
        path_ends_with(&self.stack, needle)
    }
}

fn name_from_href(href: &str) -> String {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

fn parse_listing_with<R: BufRead>(reader: R) -> Result<Vec<DavEntry>> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(false);

    let mut buf = Vec::with_capacity(8 * 1024);
    let mut parser = ListingParser::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => parser.on_start(e.name().as_ref()),
            Ok(Event::Empty(e)) => {
                parser.on_start(e.name().as_ref());
                parser.on_end();
            }
            Ok(Event::Text(e)) => parser.push_text(&decode_text(e.as_ref())?),
            Ok(Event::CData(e)) => parser.push_text(&String::from_utf8_lossy(e.as_ref())),
            Ok(Event::GeneralRef(e)) => {
                let name = String::from_utf8_lossy(e.as_ref());
                parser.push_text(&resolve_reference(&name));
            }
            Ok(Event::End(_)) => parser.on_end(),
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("XML error: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(parser.entries)
}

/// Parse an aggregated `207 Multi-Status` listing, e.g. the bytes returned by
/// [`crate::WebDavClient::list_contents`].
pub fn parse_listing(body: &[u8]) -> Result<Vec<DavEntry>> {
    parse_listing_with(Cursor::new(body))
}

fn decode_text(raw: &[u8]) -> Result<String> {
    match std::str::from_utf8(raw) {
        Ok(s) => Ok(unescape(s)
            .map_err(|err| anyhow!("XML decode error: {err}"))?
            .into_owned()),
        Err(_) => Ok(String::from_utf8_lossy(raw).into_owned()),
    }
}

/// Resolve `&name;` / `&#NN;` / `&#xHH;`; unknown entities are kept verbatim.
fn resolve_reference(name: &str) -> Cow<'static, str> {
    if let Some(resolved) = resolve_predefined_entity(name) {
        return Cow::Borrowed(resolved);
    }
    let code = match name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => name.strip_prefix('#').and_then(|dec| dec.parse().ok()),
    };
    match code.and_then(char::from_u32) {
        Some(ch) => Cow::Owned(ch.to_string()),
        None => Cow::Owned(format!("&{name};")),
    }
}
