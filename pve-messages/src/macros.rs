/// Fill a message template.
///
/// ```rust
/// use pve_messages::{msg, MESSAGES};
///
/// let text = msg!(MESSAGES.config.invalid_vmid, value = "web01");
/// assert_eq!(text, "vmid 'web01' is not a valid instance ID");
/// ```
#[macro_export]
macro_rules! msg {
    ($template:expr) => {
        $crate::builder::MessageBuilder::new($template).build()
    };
    ($template:expr, $($key:ident = $value:expr),+ $(,)?) => {
        {
            let mut builder = $crate::builder::MessageBuilder::new($template);
            $(
                builder = builder.var(stringify!($key), $value);
            )+
            builder.build()
        }
    };
}
