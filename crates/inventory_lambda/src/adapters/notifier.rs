pub trait ContactNotifier {
    fn publish(&self, subject: &str, message: &str) -> Result<(), String>;
}
