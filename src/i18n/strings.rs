/// Localized UI strings the runtime writes itself.
///
/// Page content lives in the markup's `data-bn`/`data-en` attributes; these
/// are only the handful of strings produced by feedback, toasts and metadata.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    /// Document title
    pub page_title: &'static str,

    // ==================== Copy Button Feedback ====================
    /// Label shown on a copy button after a successful copy
    pub copy_success: &'static str,

    /// Label shown on a copy button after a failed copy
    pub copy_failed: &'static str,

    // ==================== Phone Number Toasts ====================
    /// Toast shown after a phone number was copied
    pub phone_copied: &'static str,

    /// Toast shown when copying a phone number failed
    pub phone_copy_failed: &'static str,

    /// Tooltip on clickable phone numbers
    pub click_to_copy: &'static str,
}

// ==================== Bengali Strings ====================

pub const BENGALI_STRINGS: LanguageStrings = LanguageStrings {
    page_title: "ডাঃ মারজিয়া হোসেন মিতু - হোমিওপ্যাথিক বিশেষজ্ঞ",
    copy_success: "কপি হয়েছে!",
    copy_failed: "ব্যর্থ!",
    phone_copied: "ফোন নম্বর কপি করা হয়েছে!",
    phone_copy_failed: "কপি করতে ব্যর্থ!",
    click_to_copy: "ক্লিক করে কপি করুন",
};

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    page_title: "Dr. Marjia Hossan Mitu - Homeopathic Specialist",
    copy_success: "Copied!",
    copy_failed: "Failed!",
    phone_copied: "Phone number copied!",
    phone_copy_failed: "Copy failed!",
    click_to_copy: "Click to copy",
};
