//! Prompt text for the interview dialogue.

use std::collections::BTreeMap;

use crate::domain::foundation::DomainArea;
use crate::domain::registry::TopicRegistry;

const INTERVIEWER_ROLE: &str = r#"You are an experienced growth advisor running a structured expansion-readiness interview with a founder.

Work through the topics of the current domain one at a time. Ask one focused question per message, probe for specifics (numbers, dates, names of customers or partners), and keep a warm, direct tone.

Rules:
- When the founder has answered a topic, call `capture_input` with that topic's id. Use only the topic ids listed below.
- Do not call `transition_domain` until every topic below is captured. If it is refused, ask about the missing topics.
- Always finish your turn with a message to the founder."#;

/// Builds the system prompt for the current domain.
///
/// `covered` lists topic ids already captured; `summaries` holds the notes
/// recorded when earlier domains were closed.
pub fn interview_system_prompt(
    domain: DomainArea,
    covered: &[String],
    summaries: &BTreeMap<DomainArea, String>,
) -> String {
    let registry = TopicRegistry::global();
    let mut prompt = String::from(INTERVIEWER_ROLE);

    prompt.push_str(&format!(
        "\n\n## Current domain: {} ({} of {})\n",
        domain.label(),
        domain.index() + 1,
        DomainArea::ALL.len()
    ));
    for topic in registry.topics_for(domain) {
        let status = if covered.iter().any(|id| id == topic.id) {
            "captured"
        } else {
            "open"
        };
        prompt.push_str(&format!("\n- `{}` {} [{}]", topic.id, topic.label, status));
        for requirement in topic.requirements {
            prompt.push_str(&format!("\n    - {}", requirement));
        }
    }

    if !summaries.is_empty() {
        prompt.push_str("\n\n## Completed domains\n");
        for (done, summary) in summaries {
            prompt.push_str(&format!("\n- {}: {}", done.label(), summary));
        }
    }

    if domain.is_last() {
        prompt.push_str(
            "\n\nThis is the final domain. Transitioning out of it completes the interview.",
        );
    }
    prompt
}

/// Seed for the tools-disabled follow-up pass.
///
/// `replied` is true when the first pass already produced text and the
/// follow-up only exists to correct rejected calls.
pub fn follow_up_prompt(
    action_notes: &[String],
    rejected_results: &[String],
    replied: bool,
) -> String {
    let mut prompt = if replied {
        String::from(
            "Some tool calls behind your last reply were rejected, so part of what you told the founder was not recorded. Actions this turn:\n",
        )
    } else {
        String::from("You took the following actions without replying to the founder:\n")
    };
    if action_notes.is_empty() {
        prompt.push_str("\n- (no actions recorded)");
    }
    for note in action_notes {
        prompt.push_str(&format!("\n- {}", note));
    }
    if !rejected_results.is_empty() {
        prompt.push_str("\n\nResults of the rejected calls:\n");
        for result in rejected_results {
            prompt.push_str(&format!("\n- {}", result));
        }
    }
    if replied {
        prompt.push_str(
            "\n\nContinue your reply in plain text. Correct anything that was not recorded, using only the valid topic ids above, and ask for what is still missing. Tools are not available for this reply.",
        );
    } else {
        prompt.push_str(
            "\n\nReply to the founder now in plain text. Acknowledge what was recorded and ask the next question. Tools are not available for this reply.",
        );
    }
    prompt
}
