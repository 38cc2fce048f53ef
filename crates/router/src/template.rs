use crate::packet::Packet;

/// A leaf template referenced an attribute the packet does not carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPlaceholder(pub String);

/// Substitute `{name}` tokens from the packet.
///
/// `{name=default}` falls back to `default` when the attribute is absent.
/// `{{` and `}}` produce literal braces; an unclosed `{` is kept as text.
pub fn render_template(
    template: &str,
    packet: &Packet,
) -> std::result::Result<String, MissingPlaceholder> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(&['{', '}'][..]) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        let Some(close) = tail.find('}') else {
            out.push_str(tail);
            rest = "";
            break;
        };

        let token = &tail[1..close];
        let (name, default) = match token.split_once('=') {
            Some((name, default)) => (name, Some(default)),
            None => (token, None),
        };

        match (packet.text(name), default) {
            (Some(text), _) => out.push_str(&text),
            (None, Some(default)) => out.push_str(default),
            (None, None) => return Err(MissingPlaceholder(name.to_string())),
        }
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
