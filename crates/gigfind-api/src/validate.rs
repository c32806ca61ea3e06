//! Turns `validator` failures into a 400 whose message names each offending
//! field by its wire name, e.g. `payRate: must be a non-negative number`.

use validator::ValidationErrors;

use crate::error::ApiError;

/// `pay_rate` -> `payRate`, matching the camelCase request bodies.
fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            let name = wire_name(&field);
            errs.iter().map(move |e| {
                let problem = e
                    .message
                    .as_deref()
                    .map(str::to_string)
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", name, problem)
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::bad_request(describe(&errors))
    }
}

#[cfg(test)]
mod tests {
    use gigfind_types::api::{
        CreateApplicationRequest, CreateGigRequest, LoginRequest, RegisterRequest,
        SendMessageRequest, UpdateGigRequest,
    };
    use validator::Validate;

    use super::*;

    fn gig_request() -> CreateGigRequest {
        CreateGigRequest {
            title: "Logo design".into(),
            description: "Need a logo".into(),
            category: "Design".into(),
            pay_rate: 100.0,
            currency: None,
        }
    }

    fn message_of(err: ValidationErrors) -> String {
        match ApiError::from(err) {
            ApiError::BadRequest(msg) => msg,
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    fn login(email: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: "pw".into(),
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(wire_name("pay_rate"), "payRate");
        assert_eq!(wire_name("receiver_id"), "receiverId");
        assert_eq!(wire_name("title"), "title");
    }

    #[test]
    fn test_email_shapes() {
        assert!(login("a@example.com").validate().is_ok());
        assert!(login("first.last@sub.example.org").validate().is_ok());
        assert!(login("@example.com").validate().is_err());
        assert!(login("a@@example.com").validate().is_err());
        assert!(login("a b@example.com").validate().is_err());
        assert!(login("<script>@evil.com").validate().is_err());
        assert!(login("a(b)@x.y").validate().is_err());
        assert!(login("a@-.-").validate().is_err());
    }

    #[test]
    fn test_register_collects_every_field() {
        let err = RegisterRequest {
            email: "nope".into(),
            password: "123".into(),
            name: "   ".into(),
        }
        .validate()
        .unwrap_err();

        let msg = message_of(err);
        assert!(msg.contains("email: must be a valid email address"), "{}", msg);
        assert!(msg.contains("password: must be at least 6 characters"), "{}", msg);
        assert!(msg.contains("name: is required"), "{}", msg);
    }

    #[test]
    fn test_gig_limits() {
        assert!(gig_request().validate().is_ok());

        let mut long_title = gig_request();
        long_title.title = "x".repeat(201);
        assert!(message_of(long_title.validate().unwrap_err()).starts_with("title:"));

        let mut negative = gig_request();
        negative.pay_rate = -1.0;
        let msg = message_of(negative.validate().unwrap_err());
        assert_eq!(msg, "payRate: must be a non-negative number");

        let mut currency = gig_request();
        currency.currency = Some("DOUBLOONS!!".into());
        assert!(currency.validate().is_err());
    }

    #[test]
    fn test_partial_update_checks_present_fields_only() {
        assert!(UpdateGigRequest::default().validate().is_ok());
        assert!(UpdateGigRequest {
            title: Some("   ".into()),
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(UpdateGigRequest {
            pay_rate: Some(0.0),
            ..Default::default()
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn test_message_bounds() {
        let application = |len: usize| CreateApplicationRequest { message: "x".repeat(len) };
        assert!(application(2000).validate().is_ok());
        assert!(application(2001).validate().is_err());

        let err = SendMessageRequest {
            gig_id: uuid::Uuid::new_v4(),
            receiver_id: uuid::Uuid::new_v4(),
            body: "\n\t ".into(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(message_of(err), "body: is required");
    }
}
