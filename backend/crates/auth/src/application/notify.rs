//! Outbound Notifications
//!
//! Builds the email bodies the auth flows send. Transport lives in
//! `platform::mailer`.

use platform::mailer::MailMessage;

/// Code email sent when a login or enrollment needs an email challenge
pub fn two_factor_code_message(code: &str) -> MailMessage {
    MailMessage {
        subject: "Your StockExchange 2FA Code".to_string(),
        html_body: format!(
            "<p>Your verification code is:</p>\
             <p style=\"font-size:24px;font-weight:bold;letter-spacing:4px\">{code}</p>\
             <p>This code expires in 10 minutes. If you did not request it, \
             you can ignore this email.</p>"
        ),
    }
}

/// Code email sent right after signup to verify the address
pub fn signup_verification_message(code: &str) -> MailMessage {
    MailMessage {
        subject: "Verify your StockExchange account".to_string(),
        html_body: format!(
            "<p>Welcome to StockExchange. Enter this code to verify your \
             email address:</p>\
             <p style=\"font-size:24px;font-weight:bold;letter-spacing:4px\">{code}</p>\
             <p>This code expires in 10 minutes.</p>"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_the_code() {
        let msg = two_factor_code_message("482913");
        assert!(msg.html_body.contains("482913"));
        assert!(msg.html_body.contains("10 minutes"));

        let msg = signup_verification_message("482913");
        assert!(msg.html_body.contains("482913"));
    }
}
