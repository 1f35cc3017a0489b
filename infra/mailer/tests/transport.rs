use chub_domain::config::MailerDescriptor;
use chub_mailer::{
    Mail, Mailer, MailerConnector, MailerError, MemoryTransport, ServiceConnector,
};

#[tokio::test]
async fn memory_service_records_messages() {
    let descriptor = MailerDescriptor::new("memory", "shop@example.com", "");
    let transport = ServiceConnector::default().connect(&descriptor).await.unwrap();
    let mailer = Mailer::new("default", &descriptor, transport);

    mailer.send(&Mail::new("buyer@example.com", "Receipt", "Thanks")).await.unwrap();

    let outbox = mailer.downcast_ref::<MemoryTransport>().expect("memory transport");
    assert_eq!(outbox.sender(), "shop@example.com");
    assert_eq!(outbox.sent(), vec![Mail::new("buyer@example.com", "Receipt", "Thanks")]);
}

#[tokio::test]
async fn memory_transport_rejects_bad_recipients() {
    let transport = MemoryTransport::new("a@b.io");
    let err = chub_mailer::MailTransport::send(&transport, &Mail::new("nobody", "s", "b"))
        .await
        .unwrap_err();
    assert!(matches!(err, MailerError::Validation { .. }));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn blank_service_is_rejected() {
    let descriptor = MailerDescriptor::new(" ", "a@b.io", "");
    let err = ServiceConnector::default().connect(&descriptor).await.unwrap_err();
    assert!(matches!(err, MailerError::Validation { .. }));
}

#[tokio::test]
async fn smtp_sender_must_be_an_address() {
    let descriptor = MailerDescriptor::new("gmail", "shop", "secret");
    let err = ServiceConnector::default().connect(&descriptor).await.unwrap_err();
    assert!(matches!(err, MailerError::Validation { .. }));
}

#[test]
fn mail_deserializes_from_json() {
    let mail: Mail =
        serde_json::from_value(serde_json::json!({ "to": "a@b.io", "subject": "s", "body": "b" }))
            .unwrap();
    assert_eq!(mail, Mail::new("a@b.io", "s", "b"));
}
