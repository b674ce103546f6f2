use super::{Mapping, Value};
use crate::regex::Regex;
use std::sync::LazyLock;

/// Column after which scalars are folded at the next single space.
const BEST_WIDTH: usize = 80;
const BEST_INDENT: usize = 2;

static BOOL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:yes|Yes|YES|no|No|NO|true|True|TRUE|false|False|FALSE|on|On|ON|off|Off|OFF)$")
        .unwrap()
});

static FLOAT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:[-+]?(?:[0-9][0-9_]*)\.[0-9_]*(?:[eE][-+][0-9]+)?",
        r"|\.[0-9][0-9_]*(?:[eE][-+][0-9]+)?",
        r"|[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*",
        r"|[-+]?\.(?:inf|Inf|INF)",
        r"|\.(?:nan|NaN|NAN))$",
    ))
    .unwrap()
});

static INT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:[-+]?0b[0-1_]+",
        r"|[-+]?0[0-7_]+",
        r"|[-+]?(?:0|[1-9][0-9_]*)",
        r"|[-+]?0x[0-9a-fA-F_]+",
        r"|[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+)$",
    ))
    .unwrap()
});

static NULL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:~|null|Null|NULL|)$").unwrap());

static TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]",
        r"|[0-9][0-9][0-9][0-9]-[0-9][0-9]?-[0-9][0-9]?",
        r"(?:[Tt]|[ \t]+)[0-9][0-9]?:[0-9][0-9]:[0-9][0-9](?:\.[0-9]*)?",
        r"(?:[ \t]*(?:Z|[-+][0-9][0-9]?(?::[0-9][0-9])?))?)$",
    ))
    .unwrap()
});

/// The type an unquoted scalar would be read back as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Str,
    Bool,
    Float,
    Int,
    Merge,
    Null,
    Timestamp,
    Value,
}

impl Tag {
    fn resolve(text: &str) -> Self {
        if BOOL_REGEX.is_match(text) {
            Tag::Bool
        } else if FLOAT_REGEX.is_match(text) {
            Tag::Float
        } else if INT_REGEX.is_match(text) {
            Tag::Int
        } else if text == "<<" {
            Tag::Merge
        } else if NULL_REGEX.is_match(text) {
            Tag::Null
        } else if TIMESTAMP_REGEX.is_match(text) {
            Tag::Timestamp
        } else if text == "=" {
            Tag::Value
        } else {
            Tag::Str
        }
    }

    fn shorthand(self) -> &'static str {
        match self {
            Tag::Str => "!!str",
            Tag::Bool => "!!bool",
            Tag::Float => "!!float",
            Tag::Int => "!!int",
            Tag::Merge => "!!merge",
            Tag::Null => "!!null",
            Tag::Timestamp => "!!timestamp",
            Tag::Value => "!!value",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requested {
    Any,
    SingleQuoted,
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
}

/// What a scalar's characters allow it to be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Analysis {
    allow_flow_plain: bool,
    allow_block_plain: bool,
    allow_single_quoted: bool,
    allow_block: bool,
}

fn is_break(c: char) -> bool {
    matches!(c, '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

fn is_blank_or_break(c: char) -> bool {
    matches!(c, '\0' | ' ' | '\t' | '\r') || is_break(c)
}

fn is_printable_unicode(c: char) -> bool {
    matches!(c, '\u{85}' | '\u{A0}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFE}')
        && c != '\u{FEFF}'
}

fn analyze(text: &str) -> Analysis {
    if text.is_empty() {
        return Analysis {
            allow_flow_plain: false,
            allow_block_plain: true,
            allow_single_quoted: true,
            allow_block: false,
        };
    }

    let chars: Vec<char> = text.chars().collect();
    let last = chars.len() - 1;

    let mut block_indicators = text.starts_with("---") || text.starts_with("...");
    let mut flow_indicators = block_indicators;
    let mut line_breaks = false;
    let mut special_characters = false;
    let (mut leading_space, mut leading_break) = (false, false);
    let (mut trailing_space, mut trailing_break) = (false, false);
    let (mut break_space, mut space_break) = (false, false);
    let (mut previous_space, mut previous_break) = (false, false);

    for (index, &c) in chars.iter().enumerate() {
        let preceded_by_whitespace = index == 0 || is_blank_or_break(chars[index - 1]);
        let followed_by_whitespace = chars.get(index + 1).is_none_or(|&n| is_blank_or_break(n));

        if index == 0 {
            if "#,[]{}&*!|>'\"%@`".contains(c) {
                flow_indicators = true;
                block_indicators = true;
            }
            if c == '?' || c == ':' {
                flow_indicators = true;
                if followed_by_whitespace {
                    block_indicators = true;
                }
            }
            if c == '-' && followed_by_whitespace {
                flow_indicators = true;
                block_indicators = true;
            }
        } else {
            if ",?[]{}".contains(c) {
                flow_indicators = true;
            }
            if c == ':' {
                flow_indicators = true;
                if followed_by_whitespace {
                    block_indicators = true;
                }
            }
            if c == '#' && preceded_by_whitespace {
                flow_indicators = true;
                block_indicators = true;
            }
        }

        if is_break(c) {
            line_breaks = true;
        }
        if !(c == '\n' || (' '..='~').contains(&c) || is_printable_unicode(c)) {
            special_characters = true;
        }

        if c == ' ' {
            leading_space |= index == 0;
            trailing_space |= index == last;
            break_space |= previous_break;
            previous_space = true;
            previous_break = false;
        } else if is_break(c) {
            leading_break |= index == 0;
            trailing_break |= index == last;
            space_break |= previous_space;
            previous_space = false;
            previous_break = true;
        } else {
            previous_space = false;
            previous_break = false;
        }
    }

    let mut analysis = Analysis {
        allow_flow_plain: true,
        allow_block_plain: true,
        allow_single_quoted: true,
        allow_block: true,
    };
    if leading_space || leading_break || trailing_space || trailing_break {
        analysis.allow_flow_plain = false;
        analysis.allow_block_plain = false;
    }
    if trailing_space {
        analysis.allow_block = false;
    }
    if break_space {
        analysis.allow_flow_plain = false;
        analysis.allow_block_plain = false;
        analysis.allow_single_quoted = false;
    }
    if space_break || special_characters {
        analysis = Analysis {
            allow_flow_plain: false,
            allow_block_plain: false,
            allow_single_quoted: false,
            allow_block: false,
        };
    }
    if line_breaks {
        analysis.allow_flow_plain = false;
        analysis.allow_block_plain = false;
    }
    if flow_indicators {
        analysis.allow_flow_plain = false;
    }
    if block_indicators {
        analysis.allow_block_plain = false;
    }
    analysis
}

fn choose_style(analysis: Analysis, requested: Requested, plain_implicit: bool, flow: bool) -> Style {
    let plain_allowed = if flow {
        analysis.allow_flow_plain
    } else {
        analysis.allow_block_plain
    };
    match requested {
        Requested::Any if plain_implicit && plain_allowed => Style::Plain,
        Requested::Literal if !flow && analysis.allow_block => Style::Literal,
        Requested::Any | Requested::SingleQuoted if analysis.allow_single_quoted => {
            Style::SingleQuoted
        }
        _ => Style::DoubleQuoted,
    }
}

pub(crate) fn emit_document(mapping: &Mapping) -> String {
    let mut emitter = Emitter::new();
    emitter.write_indicator("---", true, false, false);
    emitter.emit_mapping(mapping, None);
    emitter.write_indent(0);
    emitter.write_indicator("...", true, false, false);
    emitter.write_indent(0);
    emitter.out
}

struct Emitter {
    out: String,
    column: usize,
    whitespace: bool,
    indention: bool,
}

impl Emitter {
    fn new() -> Self {
        Self {
            out: String::new(),
            column: 0,
            whitespace: true,
            indention: true,
        }
    }

    fn emit_mapping(&mut self, mapping: &Mapping, parent_indent: Option<usize>) {
        if mapping.is_empty() {
            self.write_indicator("{", true, true, false);
            self.write_indicator("}", false, false, false);
            return;
        }
        let indent = parent_indent.map_or(0, |i| i + BEST_INDENT);
        for (key, value) in mapping.iter() {
            self.write_indent(indent);
            self.write_plain(key, indent, false);
            self.write_indicator(":", false, false, false);
            self.emit_node(value, indent, true);
        }
    }

    fn emit_node(&mut self, value: &Value, indent: usize, mapping_context: bool) {
        let scalar_indent = indent + BEST_INDENT;
        match value {
            Value::Null => self.emit_scalar("null", Tag::Null, Requested::Any, scalar_indent, false),
            Value::Plain(text) => {
                self.emit_scalar(text, Tag::Str, Requested::Any, scalar_indent, false)
            }
            Value::Int(text) => {
                self.emit_scalar(text, Tag::Int, Requested::Any, scalar_indent, false)
            }
            Value::SingleQuoted(text) => {
                self.emit_scalar(text, Tag::Str, Requested::SingleQuoted, scalar_indent, false)
            }
            Value::Literal(text) => {
                self.emit_scalar(text, Tag::Str, Requested::Literal, scalar_indent, false)
            }
            Value::Flow(items) => self.emit_flow_sequence(items, indent),
            Value::Seq(items) if items.is_empty() => self.emit_flow_sequence(&[], indent),
            Value::Seq(items) => {
                let indentless = mapping_context && !self.indention;
                let seq_indent = if indentless { indent } else { indent + BEST_INDENT };
                for item in items {
                    self.write_indent(seq_indent);
                    self.write_indicator("-", true, false, true);
                    self.emit_node(item, seq_indent, false);
                }
            }
            Value::Map(mapping) => self.emit_mapping(mapping, Some(indent)),
        }
    }

    fn emit_flow_sequence(&mut self, items: &[String], indent: usize) {
        let flow_indent = indent + BEST_INDENT;
        self.write_indicator("[", true, true, false);
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                self.write_indicator(",", false, false, false);
            }
            if self.column > BEST_WIDTH {
                self.write_indent(flow_indent);
            }
            self.emit_scalar(item, Tag::Str, Requested::Any, flow_indent + BEST_INDENT, true);
        }
        self.write_indicator("]", false, false, false);
    }

    fn emit_scalar(&mut self, text: &str, tag: Tag, requested: Requested, indent: usize, flow: bool) {
        let plain_implicit = Tag::resolve(text) == tag;
        let style = choose_style(analyze(text), requested, plain_implicit, flow);

        let implicit = match style {
            Style::Plain => plain_implicit,
            _ => tag == Tag::Str,
        };
        if !implicit {
            self.write_indicator(tag.shorthand(), true, false, false);
        }

        match style {
            Style::Plain => self.write_plain(text, indent, true),
            Style::SingleQuoted => self.write_single_quoted(text, indent),
            Style::DoubleQuoted => self.write_double_quoted(text, indent),
            Style::Literal => self.write_literal(text, indent),
        }
    }

    fn write_indicator(&mut self, indicator: &str, need_whitespace: bool, whitespace: bool, indention: bool) {
        if !self.whitespace && need_whitespace {
            self.write_str(" ");
        }
        self.write_str(indicator);
        self.whitespace = whitespace;
        self.indention = self.indention && indention;
    }

    fn write_indent(&mut self, indent: usize) {
        if !self.indention || self.column > indent || (self.column == indent && !self.whitespace) {
            self.write_line_break('\n');
        }
        if self.column < indent {
            self.whitespace = true;
            self.out.extend(std::iter::repeat_n(' ', indent - self.column));
            self.column = indent;
        }
    }

    fn write_line_break(&mut self, line_break: char) {
        self.out.push(line_break);
        self.whitespace = true;
        self.indention = true;
        self.column = 0;
    }

    fn write_str(&mut self, text: &str) {
        self.out.push_str(text);
        self.column += text.chars().count();
    }

    fn write_chars(&mut self, chars: &[char]) {
        self.out.extend(chars);
        self.column += chars.len();
    }

    /// Writes a run of line breaks; a leading `\n` is doubled since folding
    /// would otherwise swallow it.
    fn write_breaks(&mut self, breaks: &[char], fold_leading: bool) {
        if fold_leading && breaks.first() == Some(&'\n') {
            self.write_line_break('\n');
        }
        for &line_break in breaks {
            self.write_line_break(line_break);
        }
    }

    // Plain style is never chosen for text with line breaks.
    fn write_plain(&mut self, text: &str, indent: usize, split: bool) {
        if text.is_empty() {
            return;
        }
        if !self.whitespace {
            self.write_str(" ");
        }
        self.whitespace = false;
        self.indention = false;

        let chars: Vec<char> = text.chars().collect();
        let mut spaces = false;
        let mut start = 0;
        for end in 0..=chars.len() {
            let c = chars.get(end).copied();
            if spaces {
                if c != Some(' ') {
                    if start + 1 == end && self.column > BEST_WIDTH && split {
                        self.write_indent(indent);
                        self.whitespace = false;
                        self.indention = false;
                    } else {
                        self.write_chars(&chars[start..end]);
                    }
                    start = end;
                }
            } else if c.is_none_or(|c| c == ' ' || is_break(c)) {
                self.write_chars(&chars[start..end]);
                start = end;
            }
            if let Some(c) = c {
                spaces = c == ' ';
            }
        }
    }

    fn write_single_quoted(&mut self, text: &str, indent: usize) {
        self.write_indicator("'", true, false, false);

        let chars: Vec<char> = text.chars().collect();
        let (mut spaces, mut breaks) = (false, false);
        let mut start = 0;
        for end in 0..=chars.len() {
            let c = chars.get(end).copied();
            if spaces {
                if c != Some(' ') {
                    if start + 1 == end
                        && self.column > BEST_WIDTH
                        && start != 0
                        && end != chars.len()
                    {
                        self.write_indent(indent);
                    } else {
                        self.write_chars(&chars[start..end]);
                    }
                    start = end;
                }
            } else if breaks {
                if !c.is_some_and(is_break) {
                    self.write_breaks(&chars[start..end], true);
                    self.write_indent(indent);
                    start = end;
                }
            } else if c.is_none_or(|c| c == ' ' || c == '\'' || is_break(c)) && start < end {
                self.write_chars(&chars[start..end]);
                start = end;
            }
            if c == Some('\'') {
                self.write_str("''");
                start = end + 1;
            }
            if let Some(c) = c {
                spaces = c == ' ';
                breaks = is_break(c);
            }
        }

        self.write_indicator("'", false, false, false);
    }

    fn write_double_quoted(&mut self, text: &str, indent: usize) {
        self.write_indicator("\"", true, false, false);

        let chars: Vec<char> = text.chars().collect();
        let mut start = 0;
        for end in 0..=chars.len() {
            let c = chars.get(end).copied();
            let needs_escape = c.is_none_or(|c| {
                matches!(c, '"' | '\\' | '\u{85}' | '\u{2028}' | '\u{2029}' | '\u{FEFF}')
                    || !((' '..='~').contains(&c)
                        || ('\u{A0}'..='\u{D7FF}').contains(&c)
                        || ('\u{E000}'..='\u{FFFD}').contains(&c))
            });
            if needs_escape {
                if start < end {
                    self.write_chars(&chars[start..end]);
                    start = end;
                }
                if let Some(c) = c {
                    self.write_str(&escape_char(c));
                    start = end + 1;
                }
            }
            if 0 < end
                && end + 1 < chars.len()
                && (c == Some(' ') || start >= end)
                && self.column as isize + end as isize - start as isize > BEST_WIDTH as isize
            {
                let mut data: String = chars[start.min(end)..end].iter().collect();
                data.push('\\');
                if start < end {
                    start = end;
                }
                self.write_str(&data);
                self.write_indent(indent);
                self.whitespace = false;
                self.indention = false;
                if chars.get(start) == Some(&' ') {
                    self.write_str("\\");
                }
            }
        }

        self.write_indicator("\"", false, false, false);
    }

    fn write_literal(&mut self, text: &str, indent: usize) {
        self.write_indicator(&format!("|{}", block_hints(text)), true, false, false);
        self.write_line_break('\n');

        let chars: Vec<char> = text.chars().collect();
        let mut breaks = true;
        let mut start = 0;
        for end in 0..=chars.len() {
            let c = chars.get(end).copied();
            if breaks {
                if !c.is_some_and(is_break) {
                    self.write_breaks(&chars[start..end], false);
                    if c.is_some() {
                        self.write_indent(indent);
                    }
                    start = end;
                }
            } else if c.is_none_or(is_break) {
                self.write_chars(&chars[start..end]);
                if c.is_none() {
                    self.write_line_break('\n');
                }
                start = end;
            }
            if let Some(c) = c {
                breaks = is_break(c);
            }
        }
    }
}

/// Indentation and chomping indicators for a literal block.
fn block_hints(text: &str) -> String {
    let mut hints = String::new();
    let mut chars = text.chars();
    let (Some(first), Some(last)) = (text.chars().next(), chars.next_back()) else {
        return hints;
    };
    if first == ' ' || is_break(first) {
        hints.push_str(&BEST_INDENT.to_string());
    }
    if !is_break(last) {
        hints.push('-');
    } else if text.chars().count() == 1 || chars.next_back().is_some_and(is_break) {
        hints.push('+');
    }
    hints
}

fn escape_char(c: char) -> String {
    let short = match c {
        '\0' => Some('0'),
        '\u{07}' => Some('a'),
        '\u{08}' => Some('b'),
        '\t' => Some('t'),
        '\n' => Some('n'),
        '\u{0B}' => Some('v'),
        '\u{0C}' => Some('f'),
        '\r' => Some('r'),
        '\u{1B}' => Some('e'),
        '"' => Some('"'),
        '\\' => Some('\\'),
        '\u{85}' => Some('N'),
        '\u{A0}' => Some('_'),
        '\u{2028}' => Some('L'),
        '\u{2029}' => Some('P'),
        _ => None,
    };
    match (short, u32::from(c)) {
        (Some(short), _) => format!("\\{short}"),
        (None, code) if code <= 0xFF => format!("\\x{code:02X}"),
        (None, code) if code <= 0xFFFF => format!("\\u{code:04X}"),
        (None, code) => format!("\\U{code:08X}"),
    }
}
