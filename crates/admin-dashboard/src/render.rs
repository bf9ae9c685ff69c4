//! Plain text output for the terminal

use std::fmt::Write as _;

use admin_shared::{
    nav::{MenuView, NavEntry},
    notification::NotificationPage,
    uac::Identity,
};

/// One line summary of the signed in user, with the unread badge if there is
/// one
pub fn render_header(identity: &Identity, notifications: Option<&NotificationPage>) -> String {
    let mut result = format!(
        "[{}] {} <{}> | {}",
        identity.initials(),
        identity.name,
        identity.email,
        identity.role.display_name()
    );
    if let Some(company) = identity.company.as_deref() {
        let _ = write!(result, " | {company}");
    }
    if let Some(badge) = notifications.and_then(NotificationPage::badge) {
        let _ = write!(result, " | {badge} unread");
    }
    result
}

pub fn render_menu(menu: &MenuView) -> String {
    let mut result = String::new();
    write_group(&mut result, "Main", &menu.primary);
    write_group(&mut result, "Management", &menu.secondary);
    write_group(&mut result, "Other", menu.tertiary());
    result
}

fn write_group(out: &mut String, heading: &str, entries: &[NavEntry]) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}");
    for entry in entries {
        let _ = writeln!(out, "  {:<16}{}", entry.label, entry.path);
    }
}

/// Unread notifications are marked with `*`
pub fn render_notifications(page: &NotificationPage) -> String {
    if page.notifications.is_empty() {
        return "No notifications\n".to_string();
    }
    let mut result = String::new();
    for notification in &page.notifications {
        let marker = if notification.is_read { ' ' } else { '*' };
        let _ = writeln!(
            result,
            "{marker} {:>4}  {}  {}",
            notification.id.as_ref(),
            notification.created_at.format("%Y-%m-%d %H:%M"),
            notification.title
        );
        if !notification.message.is_empty() {
            let _ = writeln!(result, "        {}", notification.message);
        }
    }
    let _ = writeln!(result, "{} unread", page.unread_count);
    result
}
