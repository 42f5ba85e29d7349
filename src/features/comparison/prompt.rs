use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::core::error::AppError;
use crate::features::comparison::helpers::summary_field;
use crate::features::news::{Article, Outlet};
use crate::features::topics::Topic;

const ELLIPSIS: char = '…';

pub struct PromptContext<'a> {
    pub liberal_name: &'a str,
    pub conservative_name: &'a str,
    pub max_chars: usize,
}

impl PromptContext<'_> {
    fn name(&self, outlet: Outlet) -> &str {
        match outlet {
            Outlet::Liberal => self.liberal_name,
            Outlet::Conservative => self.conservative_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Comparison,
    SingleOutlet(Outlet),
}

#[derive(Debug, Clone)]
struct Excerpt {
    title: String,
    description: String,
    body: String,
    published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Body,
    Description,
    Title,
}

/// What gets shortened, in order, once each side is down to one article.
#[derive(Debug, Clone, Copy)]
enum Trim {
    Newest(Field),
    Label,
}

const TRIM_ORDER: [Trim; 4] = [
    Trim::Newest(Field::Body),
    Trim::Newest(Field::Description),
    Trim::Label,
    Trim::Newest(Field::Title),
];

impl Excerpt {
    fn from_article(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            description: article.description.clone(),
            body: article.body.clone().unwrap_or_default(),
            published_at: article.published_at,
        }
    }

    fn field(&self, field: Field) -> &str {
        match field {
            Field::Body => &self.body,
            Field::Description => &self.description,
            Field::Title => &self.title,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Body => &mut self.body,
            Field::Description => &mut self.description,
            Field::Title => &mut self.title,
        }
    }
}

/// Builds the comparison prompt for `topic`, never longer than
/// `context.max_chars` characters.
///
/// Page text of older articles goes first, then the older articles
/// themselves, one at a time from whichever outlet still has more. Once each
/// side is down to its newest article, its page text and description are
/// shortened, then the story label, then the titles. Fails only when the
/// fixed instructions plus one article per outlet cannot fit at all.
pub fn build_prompt(topic: &Topic, context: &PromptContext<'_>) -> Result<String, AppError> {
    if !topic.is_comparable() {
        return Err(AppError::generation(format!(
            "topic \"{}\" lacks coverage from both outlets",
            topic.label
        )));
    }
    build(topic, context, PromptKind::Comparison)
}

/// Builds the prompt for a topic only one outlet covered, under the same
/// budget rules as [`build_prompt`].
pub fn build_single_outlet_prompt(
    topic: &Topic,
    context: &PromptContext<'_>,
) -> Result<String, AppError> {
    let outlet = topic.single_outlet().ok_or_else(|| {
        AppError::generation(format!(
            "topic \"{}\" needs coverage from exactly one outlet",
            topic.label
        ))
    })?;
    build(topic, context, PromptKind::SingleOutlet(outlet))
}

fn build(topic: &Topic, context: &PromptContext<'_>, kind: PromptKind) -> Result<String, AppError> {
    let mut liberal = excerpts(topic, Outlet::Liberal);
    let mut conservative = excerpts(topic, Outlet::Conservative);
    let mut label = topic.label.clone();

    let mut prompt = render(&label, context, kind, &liberal, &conservative);

    while char_len(&prompt) > context.max_chars {
        let Some(excerpt) = oldest_with_body(&mut liberal, &mut conservative) else {
            break;
        };
        excerpt.body.clear();
        prompt = render(&label, context, kind, &liberal, &conservative);
    }

    while char_len(&prompt) > context.max_chars && (liberal.len() > 1 || conservative.len() > 1) {
        drop_oldest(&mut liberal, &mut conservative);
        prompt = render(&label, context, kind, &liberal, &conservative);
    }

    for trim in TRIM_ORDER {
        loop {
            let overflow = char_len(&prompt).saturating_sub(context.max_chars);
            if overflow == 0 {
                return Ok(prompt);
            }

            match trim {
                Trim::Label => {
                    if label.is_empty() {
                        break;
                    }
                    label = truncate_chars(&label, char_len(&label).saturating_sub(overflow));
                }
                Trim::Newest(field) => {
                    let Some((target, current)) =
                        longest_newest(&mut liberal, &mut conservative, field)
                    else {
                        break;
                    };
                    if current == 0 {
                        break;
                    }
                    let text = target.field_mut(field);
                    *text = truncate_chars(text, current.saturating_sub(overflow));
                }
            }

            prompt = render(&label, context, kind, &liberal, &conservative);
        }
    }

    if char_len(&prompt) <= context.max_chars {
        return Ok(prompt);
    }

    Err(AppError::generation(format!(
        "prompt budget of {} characters cannot hold one article per outlet",
        context.max_chars
    )))
}

fn excerpts(topic: &Topic, outlet: Outlet) -> Vec<Excerpt> {
    let mut articles: Vec<&Article> = topic.articles_for(outlet).iter().collect();
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    articles.into_iter().map(Excerpt::from_article).collect()
}

/// The oldest excerpt, other than each side's newest, still carrying page text.
fn oldest_with_body<'a>(
    liberal: &'a mut [Excerpt],
    conservative: &'a mut [Excerpt],
) -> Option<&'a mut Excerpt> {
    liberal
        .iter_mut()
        .skip(1)
        .chain(conservative.iter_mut().skip(1))
        .filter(|excerpt| !excerpt.body.is_empty())
        .min_by_key(|excerpt| excerpt.published_at)
}

/// The newest excerpt of whichever side has the longer `field`; liberal on ties.
fn longest_newest<'a>(
    liberal: &'a mut [Excerpt],
    conservative: &'a mut [Excerpt],
    field: Field,
) -> Option<(&'a mut Excerpt, usize)> {
    let mut best: Option<(&'a mut Excerpt, usize)> = None;
    for excerpt in liberal.first_mut().into_iter().chain(conservative.first_mut()) {
        let len = char_len(excerpt.field(field));
        if best.as_ref().is_none_or(|(_, best_len)| len > *best_len) {
            best = Some((excerpt, len));
        }
    }
    best
}

fn drop_oldest(liberal: &mut Vec<Excerpt>, conservative: &mut Vec<Excerpt>) {
    let from_liberal = match liberal.len().cmp(&conservative.len()) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => {
            let liberal_oldest = liberal.last().map(|e| e.published_at);
            let conservative_oldest = conservative.last().map(|e| e.published_at);
            liberal_oldest <= conservative_oldest
        }
    };

    if from_liberal {
        liberal.pop();
    } else {
        conservative.pop();
    }
}

fn render(
    label: &str,
    context: &PromptContext<'_>,
    kind: PromptKind,
    liberal: &[Excerpt],
    conservative: &[Excerpt],
) -> String {
    let mut prompt = String::new();
    match kind {
        PromptKind::Comparison => {
            let _ = writeln!(
                prompt,
                "You compare how two American news outlets cover the same political story."
            );
        }
        PromptKind::SingleOutlet(outlet) => {
            let _ = writeln!(
                prompt,
                "You analyse how an American news outlet covers a political story. Coverage from {} could not be fetched for this run.",
                context.name(outlet.other())
            );
        }
    }
    if !label.is_empty() {
        let _ = writeln!(prompt);
        let _ = writeln!(prompt, "Story: {label}");
    }

    for (outlet, leaning, items) in [
        (Outlet::Liberal, "liberal-leaning", liberal),
        (Outlet::Conservative, "conservative-leaning", conservative),
    ] {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(prompt);
        let _ = writeln!(
            prompt,
            "Coverage from {} ({leaning}), newest first:",
            context.name(outlet)
        );
        for (index, item) in items.iter().enumerate() {
            let _ = writeln!(
                prompt,
                "{}. {} [{}]",
                index + 1,
                item.title,
                item.published_at.format("%Y-%m-%d %H:%M UTC")
            );
            if !item.description.is_empty() {
                let _ = writeln!(prompt, "   {}", item.description);
            }
            if !item.body.is_empty() {
                let _ = writeln!(prompt, "   Text: {}", item.body);
            }
        }
    }

    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Respond with one JSON object and nothing else, using exactly these string keys:"
    );
    match kind {
        PromptKind::Comparison => {
            let _ = writeln!(
                prompt,
                "- \"liberal_summary\": 4-5 bullet points on {}'s coverage: main topic, key facts, main arguments, impact.",
                context.liberal_name
            );
            let _ = writeln!(
                prompt,
                "- \"conservative_summary\": the same for {}.",
                context.conservative_name
            );
            let _ = writeln!(
                prompt,
                "- \"bias_notes\": how the framing differs: word choice, fact selection, tone, who is quoted, implied conclusions. Cite specific examples."
            );
            let _ = writeln!(
                prompt,
                "- \"blind_spots\": what each outlet leaves out: missing context, opposing views, questionable assumptions, unanswered questions."
            );
        }
        PromptKind::SingleOutlet(outlet) => {
            let _ = writeln!(
                prompt,
                "- \"{}\": 4-5 bullet points on {}'s coverage: main topic, key facts, main arguments, impact.",
                summary_field(outlet),
                context.name(outlet)
            );
            let _ = writeln!(
                prompt,
                "- \"bias_notes\": the framing: word choice, fact selection, tone, who is quoted, implied conclusions. Cite specific examples."
            );
            let _ = writeln!(
                prompt,
                "- \"blind_spots\": what the coverage leaves out: missing context, opposing views, questionable assumptions, unanswered questions."
            );
        }
    }
    let _ = write!(prompt, "Keep every bullet under 12 words.");

    prompt
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if char_len(text) <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated = truncated.trim_end().to_string();
    truncated.push(ELLIPSIS);
    truncated
}
