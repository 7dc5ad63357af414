//! Email bodies for the invitation workflow.

use crate::mail::EmailMessage;
use crate::utils::html::escape;

fn layout(heading: &str, body: &str) -> String {
    format!(
        "<div style=\"font-family: sans-serif; max-width: 560px;\">\
         <h2>{}</h2>{}\
         <p style=\"color: #666; font-size: 12px;\">Sent by JumboMap</p></div>",
        escape(heading),
        body
    )
}

pub struct InvitationLinks<'a> {
    pub accept_url: &'a str,
    pub decline_url: &'a str,
}

pub fn invitation(
    to: &str,
    event_name: &str,
    club_name: &str,
    links: &InvitationLinks<'_>,
) -> EmailMessage {
    let body = format!(
        "<p>Hello {club},</p>\
         <p>You have been assigned a table at <strong>{event}</strong>. \
         Please let us know whether your club will attend.</p>\
         <p><a href=\"{yes}\">Yes, we will be there</a></p>\
         <p><a href=\"{no}\">No, we cannot attend</a></p>\
         <p>If you accept you will be asked for a short description of your club.</p>",
        club = escape(club_name),
        event = escape(event_name),
        yes = escape(links.accept_url),
        no = escape(links.decline_url),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Invitation: {event_name}"),
        html: layout(&format!("You're invited to {event_name}"), &body),
    }
}

pub fn decline_confirmation(to: &str, event_name: &str, club_name: &str) -> EmailMessage {
    let body = format!(
        "<p>Hello {club},</p><p>We have recorded that your club will not attend \
         <strong>{event}</strong>. Thank you for letting us know.</p>",
        club = escape(club_name),
        event = escape(event_name),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Response recorded: {event_name}"),
        html: layout("Response recorded", &body),
    }
}

pub fn decline_admin_notice(
    to: &str,
    event_name: &str,
    club_name: &str,
    club_email: &str,
) -> EmailMessage {
    let body = format!(
        "<p><strong>{club}</strong> ({email}) declined the invitation to \
         <strong>{event}</strong>.</p>",
        club = escape(club_name),
        email = escape(club_email),
        event = escape(event_name),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("{club_name} declined {event_name}"),
        html: layout("Invitation declined", &body),
    }
}

pub fn registration_confirmation(
    to: &str,
    event_name: &str,
    club_name: &str,
    bio: &str,
) -> EmailMessage {
    let body = format!(
        "<p>Hello {club},</p><p>Your registration for <strong>{event}</strong> is complete. \
         Visitors will see this description:</p><blockquote>{bio}</blockquote>",
        club = escape(club_name),
        event = escape(event_name),
        bio = escape(bio),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Registration complete: {event_name}"),
        html: layout("Registration complete", &body),
    }
}

pub fn registration_admin_notice(
    to: &str,
    event_name: &str,
    club_name: &str,
    club_email: &str,
    bio: &str,
) -> EmailMessage {
    let body = format!(
        "<p><strong>{club}</strong> ({email}) registered for <strong>{event}</strong>.</p>\
         <blockquote>{bio}</blockquote>",
        club = escape(club_name),
        email = escape(club_email),
        event = escape(event_name),
        bio = escape(bio),
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("{club_name} registered for {event_name}"),
        html: layout("New registration", &body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invitation_carries_both_links() {
        let message = invitation(
            "club@example.edu",
            "Fall Fair",
            "Chess Club",
            &InvitationLinks {
                accept_url: "https://map.example.edu/api/invitations/respond?token=ab&response=yes",
                decline_url: "https://map.example.edu/api/invitations/respond?token=ab&response=no",
            },
        );

        assert_eq!(message.to, "club@example.edu");
        assert_eq!(message.subject, "Invitation: Fall Fair");
        assert!(message.html.contains("token=ab&amp;response=yes"));
        assert!(message.html.contains("token=ab&amp;response=no"));
    }

    #[test]
    fn user_text_is_escaped() {
        let message = registration_confirmation(
            "club@example.edu",
            "Fair",
            "<script>",
            "We <3 chess & checkers",
        );

        assert!(!message.html.contains("<script>"));
        assert!(message.html.contains("We &lt;3 chess &amp; checkers"));
    }
}
