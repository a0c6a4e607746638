//! Email templates for invitation and welcome mail.

/// Content for invitation emails.
pub struct InvitationEmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl InvitationEmailContent {
    /// Create invitation email content carrying the redemption URL.
    pub fn new(invite_url: &str) -> Self {
        Self {
            subject: "Quorum Invitation".to_string(),
            text: Self::text_template(invite_url),
            html: Self::html_template(invite_url),
        }
    }

    fn text_template(invite_url: &str) -> String {
        format!(
            r#"You've been invited to join Quorum!

Here's your invite url: {}

This invitation expires in 48 hours and can only be used once.

If you weren't expecting this invitation, please ignore this email.

--
The Quorum Team"#,
            invite_url
        )
    }

    fn html_template(invite_url: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 0; background: #f5f5f5; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 40px 20px; }}
        .card {{ background: white; border-radius: 8px; padding: 40px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        h1 {{ color: #1a1a1a; margin-top: 0; font-size: 24px; }}
        .button {{ display: inline-block; padding: 14px 28px; background: #2563eb; color: white; text-decoration: none; border-radius: 8px; font-weight: bold; margin: 24px 0; }}
        .expires {{ color: #666; font-size: 14px; }}
        .footer {{ margin-top: 32px; padding-top: 20px; border-top: 1px solid #eee; color: #888; font-size: 12px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="card">
            <h1>You've been invited to join Quorum!</h1>
            <p>Click the button below to claim your account:</p>
            <a class="button" href="{url}">Accept Invitation</a>
            <p class="expires">This invitation expires in 48 hours and can only be used once.</p>
            <div class="footer">
                <p>If the button doesn't work, copy this link into your browser:</p>
                <p>{url}</p>
                <p>If you weren't expecting this invitation, please ignore this email.</p>
            </div>
        </div>
    </div>
</body>
</html>"#,
            url = invite_url
        )
    }
}

/// Content for welcome emails sent after an account is claimed.
pub struct WelcomeEmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl WelcomeEmailContent {
    pub fn new() -> Self {
        Self {
            subject: "Welcome to Quorum!".to_string(),
            text: Self::text_template(),
            html: Self::html_template(),
        }
    }

    fn text_template() -> String {
        r#"Welcome to Quorum!

Your account is set up and ready to use.

--
The Quorum Team"#
            .to_string()
    }

    fn html_template() -> String {
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 0; background: #f5f5f5; }
        .container { max-width: 600px; margin: 0 auto; padding: 40px 20px; }
        .card { background: white; border-radius: 8px; padding: 40px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        h1 { color: #1a1a1a; margin-top: 0; font-size: 24px; }
        .footer { margin-top: 32px; padding-top: 20px; border-top: 1px solid #eee; color: #888; font-size: 12px; }
    </style>
</head>
<body>
    <div class="container">
        <div class="card">
            <h1>Welcome to Quorum!</h1>
            <p>Your account is set up and ready to use.</p>
            <div class="footer">
                <p>The Quorum Team</p>
            </div>
        </div>
    </div>
</body>
</html>"#
            .to_string()
    }
}

impl Default for WelcomeEmailContent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invitation_content_contains_url() {
        let url = "https://example.com/invite?token=abc123";
        let content = InvitationEmailContent::new(url);

        assert!(content.text.contains(url));
        assert!(content.html.contains(url));
    }

    #[test]
    fn test_invitation_subject() {
        let content = InvitationEmailContent::new("https://example.com/invite");
        assert_eq!(content.subject, "Quorum Invitation");
    }

    #[test]
    fn test_invitation_text_format() {
        let content = InvitationEmailContent::new("https://example.com/x");

        assert!(content.text.contains("Here's your invite url:"));
        assert!(content.text.contains("48 hours"));
        assert!(content.html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_welcome_subject() {
        let content = WelcomeEmailContent::new();
        assert_eq!(content.subject, "Welcome to Quorum!");
        assert!(content.text.contains("ready to use"));
        assert!(content.html.contains("ready to use"));
    }
}
