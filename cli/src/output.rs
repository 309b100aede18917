use colored::*;
use gemini_chat_core::{ErrorNotice, Role, Turn, TurnStore};
use lazy_static::lazy_static;
use pulldown_cmark::{CodeBlockKind, Event as MdEvent, Options, Parser as MdParser, Tag};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};

pub const TITLE: &str = "💬 Chatbot";
pub const DESCRIPTION: &str = "A simple chatbot that uses Google's Gemini models to generate responses. \
The API key is read from the config file, GEMINI_API_KEY or --api-key; \
an empty key is passed through for hosts that inject credentials.";
const UNDISPLAYABLE: &str = "*(Unable to display message content)*";

lazy_static! {
    static ref SYNTAX_SET: SyntaxSet = SyntaxSet::load_defaults_newlines();
    static ref THEME_SET: ThemeSet = ThemeSet::load_defaults();
}

/// Print the page title and description
pub fn print_banner() {
    println!("{}", TITLE.bold());
    println!("{}", DESCRIPTION.dimmed());
    println!();
}

/// Format one turn for the scrollback, prefixed by its display role
pub fn format_turn(turn: &Turn) -> String {
    let text = turn.text().unwrap_or(UNDISPLAYABLE);
    match turn.role {
        Role::User => format!("{}: {}", "You".green().bold(), text),
        Role::Assistant => format!(
            "{}: {}",
            "Assistant".blue().bold(),
            render_markdown(text).trim_end()
        ),
    }
}

pub fn print_turn(turn: &Turn) {
    println!("{}", format_turn(turn));
}

/// Format the inline error banner shown next to an error turn
pub fn format_notice(notice: &ErrorNotice) -> String {
    format!("{} {}", "[ERROR]".red().bold(), notice.message.red())
}

pub fn print_notice(notice: &ErrorNotice) {
    println!("{}", format_notice(notice));
}

/// Re-render the whole scrollback from the store
pub fn print_history(store: &TurnStore) {
    if store.is_empty() {
        println!("{}", "(no messages yet)".dimmed());
        return;
    }
    for turn in store.all() {
        print_turn(turn);
        println!();
    }
}

/// Show usage instructions when no prompt or action is provided
pub fn print_usage_instructions() {
    print!("{}", usage_text());
}

fn usage_text() -> String {
    let mut text = String::new();
    text.push_str(&format!("{}\n", "Usage:".yellow().bold()));
    text.push_str(&format!("  {}\n", "gemini-chat \"your prompt\"".green().bold()));
    text.push_str("    Send a single prompt and print the reply\n\n");
    text.push_str(&format!("  {}\n", "gemini-chat -i".green().bold()));
    text.push_str("    Start an interactive chat session\n\n");
    text.push_str(&format!("{}\n", "Options:".cyan()));
    for (flag, help) in [
        ("-i, --interactive", "Start an interactive chat session"),
        ("-k, --api-key <KEY>", "Gemini API key (or GEMINI_API_KEY)"),
        ("-m, --model <MODEL>", "Model name (default gemini-2.0-flash)"),
        ("--base-url <URL>", "Base URL of the Gemini API"),
        ("--timeout <SECS>", "Request timeout in seconds (default 30)"),
        ("-s, --system-prompt <TEXT>", "System prompt sent with every request"),
        ("--temperature <T>", "Sampling temperature"),
        ("-c, --config <PATH>", "Config file path"),
        ("-v, --verbose", "Debug logging on stderr"),
        ("-h, --help", "Show this help message"),
    ] {
        text.push_str(&format!("  {:<28} {}\n", flag, help));
    }
    text.push('\n');
    text
}

#[derive(Default)]
struct InlineStyle {
    heading: bool,
    strong: bool,
    emphasis: bool,
    strikethrough: bool,
}

impl InlineStyle {
    fn apply(&self, text: &str) -> String {
        let mut styled = text.normal();
        if self.heading {
            styled = styled.bright_cyan().bold();
        }
        if self.strong {
            styled = styled.bold();
        }
        if self.emphasis {
            styled = styled.italic();
        }
        if self.strikethrough {
            styled = styled.strikethrough();
        }
        styled.to_string()
    }
}

fn ensure_line_break(output: &mut String) {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
}

fn theme() -> Option<&'static Theme> {
    THEME_SET
        .themes
        .get("base16-ocean.dark")
        .or_else(|| THEME_SET.themes.values().next())
}

fn highlight_code(lang: &str, code: &str) -> String {
    let Some(theme) = theme() else {
        return code.to_string();
    };
    let syntax = SYNTAX_SET
        .find_syntax_by_token(lang)
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut output = String::new();
    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => output.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
            Err(_) => output.push_str(line),
        }
    }
    // Reset terminal colors before the closing rule.
    if output.ends_with('\n') {
        output.pop();
        output.push_str("\x1b[0m\n");
    } else {
        output.push_str("\x1b[0m");
    }
    output
}

/// Render markdown for the terminal, highlighting fenced code blocks
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut output = String::new();
    let mut style = InlineStyle::default();
    let mut code_block: Option<(String, String)> = None;
    let mut list_stack: Vec<Option<u64>> = Vec::new();

    for event in MdParser::new_ext(markdown, options) {
        match event {
            MdEvent::Start(Tag::Heading(..)) => {
                ensure_line_break(&mut output);
                output.push('\n');
                style.heading = true;
            }
            MdEvent::End(Tag::Heading(..)) => {
                style.heading = false;
                output.push('\n');
            }
            MdEvent::Start(Tag::Paragraph) => {
                if list_stack.is_empty() && !output.is_empty() {
                    ensure_line_break(&mut output);
                    output.push('\n');
                }
            }
            MdEvent::End(Tag::Paragraph) => ensure_line_break(&mut output),
            MdEvent::Start(Tag::BlockQuote) => {
                ensure_line_break(&mut output);
                output.push_str(&"│ ".dimmed().to_string());
            }
            MdEvent::End(Tag::BlockQuote) => ensure_line_break(&mut output),
            MdEvent::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                code_block = Some((lang, String::new()));
            }
            MdEvent::End(Tag::CodeBlock(_)) => {
                if let Some((lang, code)) = code_block.take() {
                    ensure_line_break(&mut output);
                    if !lang.is_empty() {
                        output.push_str(&format!("{}:\n", lang.cyan()));
                    }
                    output.push_str(&"─".repeat(40).dimmed().to_string());
                    output.push('\n');
                    output.push_str(&highlight_code(&lang, &code));
                    ensure_line_break(&mut output);
                    output.push_str(&"─".repeat(40).dimmed().to_string());
                    output.push('\n');
                }
            }
            MdEvent::Start(Tag::List(start)) => {
                ensure_line_break(&mut output);
                list_stack.push(start);
            }
            MdEvent::End(Tag::List(_)) => {
                list_stack.pop();
                ensure_line_break(&mut output);
            }
            MdEvent::Start(Tag::Item) => {
                ensure_line_break(&mut output);
                let indent = "  ".repeat(list_stack.len().saturating_sub(1));
                let marker = match list_stack.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}.", n);
                        *n += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
                output.push_str(&format!("{}{} ", indent, marker.yellow()));
            }
            MdEvent::End(Tag::Item) => ensure_line_break(&mut output),
            MdEvent::Start(Tag::Strong) => style.strong = true,
            MdEvent::End(Tag::Strong) => style.strong = false,
            MdEvent::Start(Tag::Emphasis) => style.emphasis = true,
            MdEvent::End(Tag::Emphasis) => style.emphasis = false,
            MdEvent::Start(Tag::Strikethrough) => style.strikethrough = true,
            MdEvent::End(Tag::Strikethrough) => style.strikethrough = false,
            MdEvent::TaskListMarker(done) => {
                output.push_str(if done { "[x] " } else { "[ ] " });
            }
            MdEvent::Code(code) => {
                output.push_str(&code.on_bright_black().white().to_string());
            }
            MdEvent::Text(text) => match code_block.as_mut() {
                Some((_, code)) => code.push_str(&text),
                None => output.push_str(&style.apply(&text)),
            },
            MdEvent::Html(html) => output.push_str(&html),
            MdEvent::SoftBreak => output.push(' '),
            MdEvent::HardBreak => output.push('\n'),
            MdEvent::Rule => {
                ensure_line_break(&mut output);
                output.push_str(&"─".repeat(40).dimmed().to_string());
                output.push('\n');
            }
            _ => {}
        }
    }

    output
}
