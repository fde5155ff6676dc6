/// Placeholder substitution for the Legacy template dialect.
///
/// Syntax:
/// - `{{Name}}` → literal placeholder
/// - `{{Name_Start}}...{{Name_End}}` → conditional block
/// - `{{Prefix_<capture>_Start}}...{{Prefix_End}}` → capturing block
/// - `{{Prefix_<capture>}}` → capturing placeholder
///
/// Every operation is a single left-to-right pass over the current text, so
/// callers control precedence purely by call order: blocks first, then
/// literals, so nothing is substituted inside text that gets removed.

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const START_SUFFIX: &str = "_Start";
const END_SUFFIX: &str = "_End";

/// A `{{...}}` marker found in template text. Offsets are byte positions
/// covering the braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker<'a> {
    start: usize,
    end: usize,
    name: &'a str,
}

/// Finds the next marker at or after `from`.
fn next_marker(template: &str, from: usize) -> Option<Marker<'_>> {
    let mut search = from;
    loop {
        let open = search + template.get(search..)?.find(OPEN)?;
        let name_start = open + OPEN.len();
        let close = name_start + template[name_start..].find(CLOSE)?;
        let segment = &template[open..close];
        // `{{{Name}}}` holds the marker `{{Name}}`, like an exact-token search would find.
        let open = open + segment.rfind(OPEN).unwrap_or(0);
        let name = &template[open + OPEN.len()..close];
        if name.is_empty() {
            search = close;
            continue;
        }
        return Some(Marker {
            start: open,
            end: close + CLOSE.len(),
            name,
        });
    }
}

fn find_marker<'a>(template: &'a str, from: usize, name: &str) -> Option<Marker<'a>> {
    let mut search = from;
    while let Some(marker) = next_marker(template, search) {
        if marker.name == name {
            return Some(marker);
        }
        search = marker.end;
    }
    None
}

/// Extracts the wildcard part of `Prefix_<capture><suffix>`.
fn capture<'a>(name: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    name.strip_prefix(prefix)?
        .strip_prefix('_')?
        .strip_suffix(suffix)
}

/// Builds the literal token for a placeholder name: `{{name}}`.
pub fn placeholder_token(name: &str) -> String {
    format!("{}{}{}", OPEN, name, CLOSE)
}

pub fn start_marker(name: &str) -> String {
    placeholder_token(&format!("{}{}", name, START_SUFFIX))
}

pub fn end_marker(name: &str) -> String {
    placeholder_token(&format!("{}{}", name, END_SUFFIX))
}

/// Replaces every `{{name}}` with `value`.
pub fn substitute_literal(template: &str, name: &str, value: &str) -> String {
    template.replace(&placeholder_token(name), value)
}

/// Like [`substitute_literal`], but only computes the value when the
/// template actually contains `{{name}}`.
pub fn substitute_literal_with<F>(template: &str, name: &str, f: F) -> String
where
    F: FnOnce() -> String,
{
    let token = placeholder_token(name);
    if template.contains(&token) {
        template.replace(&token, &f())
    } else {
        template.to_string()
    }
}

/// Replaces every `{{Prefix_<capture>}}` with `f(capture)`.
///
/// Block markers (`..._Start` / `..._End`) never match, so a capturing
/// placeholder and a block may share a prefix.
pub fn substitute_by_function<F>(template: &str, prefix: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut output = String::with_capacity(template.len());
    let mut cursor = 0;
    while let Some(marker) = next_marker(template, cursor) {
        output.push_str(&template[cursor..marker.start]);
        let is_block_marker =
            marker.name.ends_with(START_SUFFIX) || marker.name.ends_with(END_SUFFIX);
        let captured = capture(marker.name, prefix, "")
            .filter(|c| !c.is_empty() && !is_block_marker);
        match captured {
            Some(captured) => output.push_str(&f(captured)),
            None => output.push_str(&template[marker.start..marker.end]),
        }
        cursor = marker.end;
    }
    output.push_str(&template[cursor..]);
    output
}

/// Resolves every `{{name_Start}}...{{name_End}}` block: keeps the inner
/// text (markers stripped) or removes the whole span.
pub fn substitute_block(template: &str, name: &str, keep: bool) -> String {
    let start_name = format!("{}{}", name, START_SUFFIX);
    let end_name = format!("{}{}", name, END_SUFFIX);
    resolve_blocks(template, &end_name, |marker| {
        (marker == start_name).then_some(keep)
    })
}

/// Resolves every `{{Prefix_<capture>_Start}}...{{Prefix_End}}` block,
/// deciding each occurrence on its own with `predicate(capture)`.
pub fn substitute_block_by_predicate<P>(template: &str, prefix: &str, mut predicate: P) -> String
where
    P: FnMut(&str) -> bool,
{
    let end_name = format!("{}{}", prefix, END_SUFFIX);
    resolve_blocks(template, &end_name, |marker| {
        capture(marker, prefix, START_SUFFIX).map(&mut predicate)
    })
}

/// Shared block scanner. `decide` returns `Some(keep)` for markers that
/// open a block. Each opening marker pairs with the first following
/// `end_name` marker; an opening marker without one is left untouched.
fn resolve_blocks<D>(template: &str, end_name: &str, mut decide: D) -> String
where
    D: FnMut(&str) -> Option<bool>,
{
    let mut output = String::with_capacity(template.len());
    let mut copied = 0;
    let mut search = 0;
    while let Some(marker) = next_marker(template, search) {
        search = marker.end;
        let Some(keep) = decide(marker.name) else {
            continue;
        };
        let Some(end) = find_marker(template, marker.end, end_name) else {
            continue;
        };
        output.push_str(&template[copied..marker.start]);
        if keep {
            output.push_str(&template[marker.end..end.start]);
        }
        copied = end.end;
        search = end.end;
    }
    output.push_str(&template[copied..]);
    output
}

/// Every marker name in the template, in order of appearance, without
/// duplicates.
pub fn placeholder_names(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    let mut search = 0;
    while let Some(marker) = next_marker(template, search) {
        search = marker.end;
        if !names.contains(&marker.name) {
            names.push(marker.name);
        }
    }
    names
}

/// Lists block names whose start and end markers do not pair up, in order
/// of appearance. A capturing start (`Prefix_x_Start`) pairs with
/// `Prefix_End`.
pub fn unbalanced_blocks(template: &str) -> Vec<String> {
    let mut open: Vec<&str> = Vec::new();
    let mut problems = Vec::new();
    let mut search = 0;
    while let Some(marker) = next_marker(template, search) {
        search = marker.end;
        if let Some(base) = marker.name.strip_suffix(START_SUFFIX) {
            open.push(base);
        } else if let Some(base) = marker.name.strip_suffix(END_SUFFIX) {
            let pairs = |start: &&str| {
                *start == base
                    || start
                        .strip_prefix(base)
                        .is_some_and(|rest| rest.starts_with('_'))
            };
            match open.iter().rposition(pairs) {
                Some(index) => {
                    open.remove(index);
                }
                None => problems.push(marker.name.to_string()),
            }
        }
    }
    problems.extend(
        open.into_iter()
            .map(|base| format!("{}{}", base, START_SUFFIX)),
    );
    problems
}
