/// Builds [`MessageContent`](crate::MessageContent) from text and optional
/// `kind => url` attachments.
///
/// ```rust
/// use iobackend::io_content;
///
/// let content = io_content!("look", image => "https://cdn.example.com/cat.png");
/// assert_eq!(content.text, "look");
/// assert_eq!(content.media[0].media_type, "image");
/// ```
#[macro_export]
macro_rules! io_content {
    ($text:expr $(,)?) => {
        $crate::MessageContent::text($text)
    };
    ($text:expr, $($kind:ident => $url:expr),+ $(,)?) => {
        $crate::MessageContent::text($text)
            $(.with_media($crate::MediaItem::new(stringify!($kind), $url)))+
    };
}
