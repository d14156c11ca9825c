//! Tag scanning over raw XML text.
//!
//! Capabilities documents are read without building a DOM. Every lookup is a
//! single forward scan over the string that tracks how deeply the searched
//! element is nested, so nested elements with the same name (WMS `Layer`
//! inside `Layer`) resolve to the right closing tag. Names are compared on
//! their local part only, so `ows:Operation`, `Operation` and
//! `ows11:Operation` are the same element.

use std::borrow::Cow;

/// One element found in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// The whole element, opening tag through closing tag
    pub outer: &'a str,
    /// Everything between the opening and closing tags (empty when self-closing)
    pub inner: &'a str,
    /// Byte offset of `<` in the scanned text
    pub start: usize,
    /// Byte offset one past the final `>`
    pub end: usize,
    inner_start: usize,
}

impl<'a> Tag<'a> {
    /// The opening tag including its attributes, e.g. `<Dimension name="time">`.
    pub fn opening(&self) -> &'a str {
        &self.outer[..self.inner_start - self.start]
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        get_attribute(self.opening(), name)
    }

    /// Trimmed, entity-decoded text content; `None` when empty.
    pub fn text(&self) -> Option<String> {
        text_content(self.inner)
    }

    pub fn is_self_closing(&self) -> bool {
        self.inner_start == self.end
    }
}

/// The part of a qualified name after the last `:`.
pub fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// First element named `name`.
pub fn find_tag<'a>(xml: &'a str, name: &str) -> Option<Tag<'a>> {
    scan(xml, local_name(name), 0, xml.len())
}

/// Every outermost element named `name`, in document order.
pub fn find_tags<'a>(xml: &'a str, name: &str) -> Vec<Tag<'a>> {
    scan_all(xml, local_name(name), 0, xml.len())
}

/// Drill through `path`, each step searching inside the previous match.
pub fn find_tag_by_path<'a>(xml: &'a str, path: &[&str]) -> Option<Tag<'a>> {
    let (last, parents) = path.split_last()?;
    let (from, to) = descend(xml, parents)?;
    scan(xml, local_name(last), from, to)
}

/// Every element matching the last step of `path` inside the first match of
/// the preceding steps.
pub fn find_tags_by_path<'a>(xml: &'a str, path: &[&str]) -> Vec<Tag<'a>> {
    let Some((last, parents)) = path.split_last() else {
        return Vec::new();
    };
    match descend(xml, parents) {
        Some((from, to)) => scan_all(xml, local_name(last), from, to),
        None => Vec::new(),
    }
}

/// Text of the first element named `name`.
pub fn find_tag_text(xml: &str, name: &str) -> Option<String> {
    find_tag(xml, name).and_then(|tag| tag.text())
}

/// Text of every outermost element named `name`, skipping empty ones.
pub fn find_tag_texts(xml: &str, name: &str) -> Vec<String> {
    find_tags(xml, name)
        .iter()
        .filter_map(|tag| tag.text())
        .collect()
}

/// `xml` with every outermost element named `name` cut out.
pub fn without_tags<'a>(xml: &'a str, name: &str) -> Cow<'a, str> {
    let tags = find_tags(xml, name);
    if tags.is_empty() {
        return Cow::Borrowed(xml);
    }
    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0;
    for tag in tags {
        out.push_str(&xml[cursor..tag.start]);
        cursor = tag.end;
    }
    out.push_str(&xml[cursor..]);
    Cow::Owned(out)
}

/// Opening tag of the document element, skipping the prolog, comments and doctype.
pub fn root_element(xml: &str) -> Option<&str> {
    let mut pos = 0;
    loop {
        let lt = pos + xml[pos..].find('<')?;
        let rest = &xml[lt..];
        if rest.starts_with("<!--") {
            pos = lt + rest.find("-->")? + 3;
        } else if rest.starts_with("<?") || rest.starts_with("<!") {
            pos = lt + rest.find('>')? + 1;
        } else if rest.starts_with("</") {
            return None;
        } else {
            return Some(&rest[..=tag_end(rest)?]);
        }
    }
}

/// Value of attribute `attr` in an opening tag.
///
/// The exact attribute name is tried first, then the local part, so `href`
/// finds `xlink:href`. Values are entity-decoded.
pub fn get_attribute(opening_tag: &str, attr: &str) -> Option<String> {
    let attributes = parse_attributes(opening_tag);
    attributes
        .iter()
        .find(|(name, _)| *name == attr)
        .or_else(|| {
            let wanted = local_name(attr);
            attributes.iter().find(|(name, _)| local_name(name) == wanted)
        })
        .map(|(_, value)| decode_entities(value).into_owned())
}

/// Decode the predefined XML entities and numeric character references.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Trimmed text of an element body, unwrapping CDATA sections.
pub fn text_content(inner: &str) -> Option<String> {
    let trimmed = inner.trim();
    let text = match trimmed
        .strip_prefix("<![CDATA[")
        .and_then(|s| s.strip_suffix("]]>"))
    {
        Some(cdata) => cdata.trim().to_string(),
        None => decode_entities(trimmed).into_owned(),
    };
    (!text.is_empty()).then_some(text)
}

fn descend(xml: &str, path: &[&str]) -> Option<(usize, usize)> {
    let mut range = (0, xml.len());
    for name in path {
        let tag = scan(xml, local_name(name), range.0, range.1)?;
        range = (tag.inner_start, tag.inner_start + tag.inner.len());
    }
    Some(range)
}

fn scan_all<'a>(xml: &'a str, local: &str, from: usize, to: usize) -> Vec<Tag<'a>> {
    let mut tags = Vec::new();
    let mut cursor = from;
    while let Some(tag) = scan(xml, local, cursor, to) {
        cursor = tag.end;
        tags.push(tag);
    }
    tags
}

/// Forward scan of `xml[from..to]` for the first element with local name `local`.
fn scan<'a>(xml: &'a str, local: &str, from: usize, to: usize) -> Option<Tag<'a>> {
    let bytes = xml.as_bytes();
    let mut pos = from;
    let mut depth = 0usize;
    let mut open: Option<(usize, usize)> = None;

    while pos < to {
        let lt = pos + xml[pos..to].find('<')?;
        let rest = &xml[lt..to];

        if rest.starts_with("<!--") {
            pos = lt + rest.find("-->")? + 3;
            continue;
        }
        if rest.starts_with("<![CDATA[") {
            pos = lt + rest.find("]]>")? + 3;
            continue;
        }
        if rest.starts_with("<?") || rest.starts_with("<!") {
            pos = lt + rest.find('>')? + 1;
            continue;
        }

        let gt = lt + tag_end(rest)?;
        let closing = bytes.get(lt + 1) == Some(&b'/');
        let name_start = if closing { lt + 2 } else { lt + 1 };
        let name = element_name(&xml[name_start..gt]);

        if local_name(name) == local {
            if closing {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        let (start, inner_start) = open?;
                        let end = gt + 1;
                        return Some(Tag {
                            outer: &xml[start..end],
                            inner: &xml[inner_start..lt],
                            start,
                            end,
                            inner_start,
                        });
                    }
                }
            } else {
                let self_closing = bytes[gt - 1] == b'/';
                if depth == 0 {
                    if self_closing {
                        let end = gt + 1;
                        return Some(Tag {
                            outer: &xml[lt..end],
                            inner: "",
                            start: lt,
                            end,
                            inner_start: end,
                        });
                    }
                    open = Some((lt, gt + 1));
                }
                if !self_closing {
                    depth += 1;
                }
            }
        }
        pos = gt + 1;
    }
    None
}

/// Offset of the `>` closing a tag that starts at `tag[0]`, skipping quoted values.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, b) in tag.bytes().enumerate().skip(1) {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return Some(i),
            _ => {}
        }
    }
    None
}

fn element_name(s: &str) -> &str {
    let end = s
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(s.len());
    &s[..end]
}

fn parse_attributes(opening_tag: &str) -> Vec<(&str, &str)> {
    let body = opening_tag
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim_end_matches('/');
    let mut rest = &body[element_name(body).len()..];
    let mut attributes = Vec::new();

    loop {
        rest = rest.trim_start();
        let Some(eq) = rest.find('=') else {
            break;
        };
        let name = rest[..eq].trim();
        let after = rest[eq + 1..].trim_start();
        let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            break;
        };
        let Some(close) = after[1..].find(quote) else {
            break;
        };
        attributes.push((name, &after[1..close + 1]));
        rest = &after[close + 2..];
    }
    attributes
}
