use easy_ext::ext;

pub(crate) mod prelude {
    pub(crate) use super::ErrorExt as _;
    pub(crate) use super::StrExt as _;
}

#[ext(ErrorExt)]
pub(crate) impl<E> E
where
    E: std::error::Error + ?Sized,
{
    fn display_chain(&self) -> display_error_chain::DisplayErrorChain<&Self> {
        display_error_chain::DisplayErrorChain::new(self)
    }
}

#[ext(StrExt)]
pub(crate) impl str {
    /// Cuts the string to at most `max_chars` characters, replacing the tail
    /// with an ellipsis if anything was cut off.
    fn truncate_chars(&self, max_chars: usize) -> String {
        if self.chars().count() <= max_chars {
            return self.to_owned();
        }

        let mut truncated: String = self.chars().take(max_chars.saturating_sub(1)).collect();
        truncated.push('…');
        truncated
    }
}
