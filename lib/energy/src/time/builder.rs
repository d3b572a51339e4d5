#[macro_export]
macro_rules! t {
    (now) => {{
        $crate::time::DateTime::now()
    }};
}

#[cfg(test)]
mod tests {
    use crate::time::*;

    #[test]
    fn test_now() {
        let now = t!(now);
        assert!(DateTime::now().elapsed_since(now) < Duration::minutes(1));
    }

    #[tokio::test]
    async fn test_now_follows_fixed_clock() {
        let fixed = DateTime::from_iso("2024-03-01T10:15:00Z").unwrap();
        let now = FIXED_NOW.scope(fixed, async { t!(now) }).await;
        assert_eq!(now, fixed);
    }
}
