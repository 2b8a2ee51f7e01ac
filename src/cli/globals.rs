use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub store_url: String,
    pub store_token: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(store_url: String) -> Self {
        Self {
            store_url,
            store_token: SecretString::default(),
        }
    }

    pub fn set_token(&mut self, token: SecretString) {
        self.store_token = token;
    }
}
