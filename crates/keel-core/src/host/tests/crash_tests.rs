use crate::host::crash::panic_message;

#[test]
fn test_panic_message_payloads() {
    let text: Box<dyn std::any::Any + Send> = Box::new("static text");
    assert_eq!(panic_message(text.as_ref()), "static text");

    let owned: Box<dyn std::any::Any + Send> = Box::new(format!("code {}", 7));
    assert_eq!(panic_message(owned.as_ref()), "code 7");

    let other: Box<dyn std::any::Any + Send> = Box::new(42_u8);
    assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
}
