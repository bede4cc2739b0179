use std::fmt::{Display, Write};

use chrono::{DateTime, Days, NaiveDate, TimeZone};

use crate::common::{ChatMessage, ConversationContext, CurrentUser};
use crate::ui::state::ChatStore;

pub const EMPTY_TRANSCRIPT: &str = "No messages yet. Start the conversation!";
pub const LOADING: &str = "Loading messages...";

/// Nhãn ngày: `Today`, `Yesterday` hoặc ngày cụ thể.
pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".to_string()
    } else if today.checked_sub_days(Days::new(1)) == Some(day) {
        "Yesterday".to_string()
    } else {
        day.format("%Y-%m-%d").to_string()
    }
}

pub fn title(ctx: &ConversationContext, user: &CurrentUser) -> String {
    let counterpart = ctx.counterpart_name(user.role).unwrap_or("Unknown");
    match ctx.job_title.as_deref() {
        Some(job) => format!("Chat with {counterpart} - {job}"),
        None => format!("Chat with {counterpart}"),
    }
}

fn sender_label<'a>(message: &'a ChatMessage, me: &str) -> &'a str {
    if message.sender == me {
        "You"
    } else {
        message.sender_display_name.as_deref().unwrap_or("Unknown")
    }
}

/// Render transcript, nhóm theo ngày (theo múi giờ của `now`).
///
/// Các tin liên tiếp của cùng một người gửi dùng chung một dòng tiêu đề.
pub fn render<Tz>(messages: &[ChatMessage], me: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if messages.is_empty() {
        return EMPTY_TRANSCRIPT.to_string();
    }

    let tz = now.timezone();
    let today = now.date_naive();

    let mut groups: Vec<(NaiveDate, Vec<&ChatMessage>)> = Vec::new();
    for message in messages {
        let day = message.created_at.with_timezone(&tz).date_naive();
        match groups.iter_mut().find(|(group_day, _)| *group_day == day) {
            Some((_, group)) => group.push(message),
            None => groups.push((day, vec![message])),
        }
    }

    let mut out = String::new();
    for (day, group) in groups {
        let _ = writeln!(out, "--- {} ---", day_label(day, today));
        let mut previous_sender: Option<&str> = None;
        for message in group {
            if previous_sender != Some(message.sender.as_str()) {
                let _ = writeln!(out, "[{}]", sender_label(message, me));
            }
            previous_sender = Some(message.sender.as_str());

            let time = message.created_at.with_timezone(&tz).format("%H:%M");
            let pending = if message.is_provisional() { " (sending...)" } else { "" };
            let _ = writeln!(out, "  {time}  {}{pending}", message.content);
        }
    }
    out
}

/// Toàn bộ nội dung hộp thoại: dòng loading (nếu đang tải) rồi transcript.
pub fn render_view<Tz>(store: &ChatStore, me: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if !store.is_loading() {
        return render(store.messages(), me, now);
    }
    if store.messages().is_empty() {
        return LOADING.to_string();
    }
    format!("{LOADING}\n{}", render(store.messages(), me, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{MessageId, MessageStatus};
    use chrono::Utc;

    fn message(id: &str, sender: &str, name: Option<&str>, at: &str) -> ChatMessage {
        ChatMessage {
            id: MessageId::from(id),
            content: format!("text {id}"),
            sender: sender.to_string(),
            receiver: None,
            sender_display_name: name.map(str::to_string),
            receiver_display_name: None,
            application: None,
            created_at: at.parse().unwrap(),
            status: MessageStatus::Confirmed,
        }
    }

    #[test]
    fn labels_today_yesterday_and_dates() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(day_label(today, today), "Today");
        assert_eq!(
            day_label(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(), today),
            "Yesterday"
        );
        assert_eq!(
            day_label(NaiveDate::from_ymd_opt(2024, 2, 27).unwrap(), today),
            "2024-02-27"
        );
    }

    #[test]
    fn title_names_the_other_party() {
        use crate::common::{ApplicantContact, Role};

        let ctx = ConversationContext {
            job_title: Some("Designer".into()),
            applicant: Some(ApplicantContact {
                id: "a1".into(),
                fullname: Some("Ann".into()),
            }),
            ..ConversationContext::new("app1")
        };
        let recruiter = CurrentUser {
            id: "r1".into(),
            fullname: "Rita".into(),
            role: Role::Recruiter,
        };
        assert_eq!(title(&ctx, &recruiter), "Chat with Ann - Designer");

        let applicant = CurrentUser {
            role: Role::Applicant,
            ..recruiter
        };
        assert_eq!(title(&ctx, &applicant), "Chat with Unknown - Designer");
    }

    #[test]
    fn view_shows_loading_line_while_fetching() {
        let now: DateTime<Utc> = "2024-03-01T12:00:00Z".parse().unwrap();
        let mut store = ChatStore::new();
        store.begin_fetch();
        assert_eq!(render_view(&store, "u1", &now), LOADING);

        store.append(message("m1", "u1", None, "2024-03-01T10:00:00Z"));
        let view = render_view(&store, "u1", &now);
        assert!(view.starts_with(LOADING));
        assert!(view.contains("text m1"));

        store.set_loading(false);
        assert!(!render_view(&store, "u1", &now).contains(LOADING));
    }

    #[test]
    fn empty_transcript_has_placeholder() {
        assert_eq!(render(&[], "u1", &Utc::now()), EMPTY_TRANSCRIPT);
    }

    #[test]
    fn groups_by_day_and_collapses_repeated_sender() {
        let now: DateTime<Utc> = "2024-03-01T12:00:00Z".parse().unwrap();
        let mut pending = message("m4", "u1", None, "2024-03-01T11:00:00Z");
        pending.id = MessageId::new_local();
        pending.status = MessageStatus::Provisional;

        let messages = vec![
            message("m1", "r1", Some("Rita"), "2024-02-29T09:00:00Z"),
            message("m2", "r1", Some("Rita"), "2024-02-29T09:01:00Z"),
            message("m3", "x9", None, "2024-03-01T10:00:00Z"),
            pending,
        ];

        let expected = "\
--- Yesterday ---
[Rita]
  09:00  text m1
  09:01  text m2
--- Today ---
[Unknown]
  10:00  text m3
[You]
  11:00  text m4 (sending...)
";
        assert_eq!(render(&messages, "u1", &now), expected);
    }
}
