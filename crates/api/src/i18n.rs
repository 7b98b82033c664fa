//! Message lookup for response envelopes.
//!
//! Keys are the camelCase codes returned by domain errors plus a handful of
//! success keys. Unknown keys are returned unchanged.

/// Supported response languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    /// English.
    #[default]
    En,
    /// Persian.
    Fa,
}

impl Lang {
    /// Picks the first supported language from an `Accept-Language` value.
    ///
    /// Quality weights are ignored; entries are taken in header order.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Self {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .map(|tag| tag.trim().to_ascii_lowercase())
            .find_map(|tag| match tag.split('-').next() {
                Some("fa") => Some(Self::Fa),
                Some("en") => Some(Self::En),
                _ => None,
            })
            .unwrap_or_default()
    }
}

const EN: &[(&str, &str)] = &[
    // success
    ("fetched", "Fetched successfully"),
    ("created", "Created successfully"),
    ("updated", "Updated successfully"),
    ("deleted", "Deleted successfully"),
    ("posted", "Posted successfully"),
    ("reversed", "Journal reversed"),
    ("bulkPosted", "Journals posted"),
    ("reordered", "Journal codes reordered"),
    ("opened", "Fiscal year opened"),
    ("closed", "Fiscal year closed"),
    ("linked", "Detail linked to level"),
    ("unlinked", "Detail unlinked from level"),
    ("healthy", "Service is healthy"),
    // request
    ("unauthorized", "Authentication required"),
    ("tokenExpired", "Token has expired"),
    ("invalidPayload", "Request payload is invalid"),
    ("internalError", "An unexpected error occurred"),
    // taxonomy
    ("invalidKind", "Invalid code kind"),
    ("requiredField", "A required field is missing"),
    ("invalidGroupCode", "Group codes must be exactly two digits"),
    ("invalidParent", "Invalid parent"),
    ("invalidDetailCode", "Detail codes must be four digits"),
    ("linkMustBeLeaf", "Details can only be linked to leaf levels"),
    ("duplicateCode", "This code is already in use"),
    ("hasChildren", "Remove the children first"),
    ("codeInUse", "This code is referenced and cannot be deleted"),
    ("detailInUse", "This detail is referenced and cannot be deleted"),
    ("levelInUse", "This level has linked details"),
    ("systemManaged", "System-managed records cannot be changed"),
    ("detailCodeSpaceExhausted", "No free detail codes are left"),
    ("notFound", "Record not found"),
    // fiscal
    ("invalidDateRange", "Start date must be before end date"),
    ("overlappingYear", "Fiscal years cannot overlap"),
    ("fiscalYearInUse", "This fiscal year has documents"),
    ("fiscalYearNotClosed", "Close the fiscal year first"),
    ("nextYearExists", "The next fiscal year already exists"),
    ("fiscalYearOpenConflict", "Another fiscal year was opened at the same time"),
    ("noOpenFiscalYear", "No fiscal year is open"),
    // ledger
    ("itemsRequired", "At least one item is required"),
    ("invalidAmount", "Invalid amount"),
    ("invalidCode", "Unknown account code"),
    ("unbalanced", "Debits and credits do not balance"),
    ("invalidFilter", "Invalid filter"),
    ("cannotModifyPosted", "Posted journals cannot be changed"),
    ("canOnlyReversePosted", "Only posted journals can be reversed"),
    ("duplicateRefNo", "This reference number is already in use"),
    // treasury
    ("invalidInstrumentType", "Invalid instrument type"),
    ("instrumentSourceRequired", "This instrument needs a source"),
    ("totalMismatch", "Item amounts do not add up to the total"),
    ("cashboxRequired", "A cashbox is required for cash or check items"),
    ("invalidPageCount", "Checkbooks need at least one page"),
    ("invalidCheckNumber", "Invalid check number"),
    ("serialOutOfRange", "Serial is outside the checkbook range"),
    ("checkbookRequired", "Outgoing checks require a checkbook"),
    ("checkDirectionMismatch", "This check cannot be used in this document"),
    ("alreadyPosted", "This document has already been posted"),
    ("checkbookExhausted", "This checkbook is exhausted"),
    ("duplicateCheckNumber", "This check number is already in use"),
    ("duplicateNumber", "This document number is already in use"),
    ("checkNotDeletable", "This check cannot be deleted"),
    ("missingMapping", "Account mapping is not configured"),
];

const FA: &[(&str, &str)] = &[
    ("fetched", "با موفقیت دریافت شد"),
    ("created", "با موفقیت ایجاد شد"),
    ("updated", "با موفقیت ویرایش شد"),
    ("deleted", "با موفقیت حذف شد"),
    ("posted", "با موفقیت ثبت شد"),
    ("reversed", "سند برگشت خورد"),
    ("bulkPosted", "اسناد ثبت شدند"),
    ("reordered", "کدهای اسناد مرتب شدند"),
    ("opened", "سال مالی باز شد"),
    ("closed", "سال مالی بسته شد"),
    ("linked", "تفصیلی به سطح متصل شد"),
    ("unlinked", "اتصال تفصیلی حذف شد"),
    ("healthy", "سرویس سالم است"),
    ("unauthorized", "احراز هویت لازم است"),
    ("tokenExpired", "توکن منقضی شده است"),
    ("invalidPayload", "داده‌های درخواست نامعتبر است"),
    ("internalError", "خطای غیرمنتظره رخ داد"),
    ("invalidKind", "نوع کد نامعتبر است"),
    ("requiredField", "یک فیلد الزامی وارد نشده است"),
    ("invalidGroupCode", "کد گروه باید دو رقمی باشد"),
    ("invalidParent", "والد نامعتبر است"),
    ("invalidDetailCode", "کد تفصیلی باید چهار رقمی باشد"),
    ("linkMustBeLeaf", "تفصیلی فقط به سطح برگ متصل می‌شود"),
    ("duplicateCode", "این کد قبلا استفاده شده است"),
    ("hasChildren", "ابتدا زیرمجموعه‌ها را حذف کنید"),
    ("codeInUse", "این کد استفاده شده و قابل حذف نیست"),
    ("detailInUse", "این تفصیلی استفاده شده و قابل حذف نیست"),
    ("levelInUse", "این سطح به تفصیلی متصل است"),
    ("systemManaged", "رکوردهای سیستمی قابل تغییر نیستند"),
    ("detailCodeSpaceExhausted", "کد تفصیلی آزاد باقی نمانده است"),
    ("notFound", "رکورد یافت نشد"),
    ("invalidDateRange", "تاریخ شروع باید قبل از تاریخ پایان باشد"),
    ("overlappingYear", "سال‌های مالی نباید هم‌پوشانی داشته باشند"),
    ("fiscalYearInUse", "این سال مالی سند دارد"),
    ("fiscalYearNotClosed", "ابتدا سال مالی را ببندید"),
    ("nextYearExists", "سال مالی بعدی وجود دارد"),
    ("fiscalYearOpenConflict", "سال مالی دیگری همزمان باز شد"),
    ("noOpenFiscalYear", "هیچ سال مالی بازی وجود ندارد"),
    ("itemsRequired", "حداقل یک ردیف لازم است"),
    ("invalidAmount", "مبلغ نامعتبر است"),
    ("invalidCode", "کد حساب ناشناخته است"),
    ("unbalanced", "جمع بدهکار و بستانکار برابر نیست"),
    ("invalidFilter", "فیلتر نامعتبر است"),
    ("cannotModifyPosted", "سند قطعی قابل تغییر نیست"),
    ("canOnlyReversePosted", "فقط سند قطعی برگشت می‌خورد"),
    ("duplicateRefNo", "این شماره عطف قبلا استفاده شده است"),
    ("invalidInstrumentType", "نوع ابزار پرداخت نامعتبر است"),
    ("instrumentSourceRequired", "منبع ابزار پرداخت مشخص نشده است"),
    ("totalMismatch", "جمع ردیف‌ها با مبلغ کل برابر نیست"),
    ("cashboxRequired", "برای نقد یا چک صندوق لازم است"),
    ("invalidPageCount", "دسته چک حداقل یک برگ دارد"),
    ("invalidCheckNumber", "شماره چک نامعتبر است"),
    ("serialOutOfRange", "سریال خارج از بازه دسته چک است"),
    ("checkbookRequired", "چک پرداختی باید از دسته چک صادر شود"),
    ("checkDirectionMismatch", "این چک در این سند قابل استفاده نیست"),
    ("alreadyPosted", "این سند قبلا ثبت شده است"),
    ("checkbookExhausted", "برگ‌های این دسته چک تمام شده است"),
    ("duplicateCheckNumber", "این شماره چک قبلا ثبت شده است"),
    ("duplicateNumber", "این شماره سند قبلا استفاده شده است"),
    ("checkNotDeletable", "این چک قابل حذف نیست"),
    ("missingMapping", "حساب‌های پیش‌فرض تنظیم نشده‌اند"),
];

/// Looks up `key` in `lang`, falling back to English and then to the key.
#[must_use]
pub fn t<'a>(key: &'a str, lang: Lang) -> &'a str {
    let table = match lang {
        Lang::En => EN,
        Lang::Fa => FA,
    };
    lookup(table, key)
        .or_else(|| lookup(EN, key))
        .unwrap_or(key)
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("fa-IR,fa;q=0.9,en;q=0.8", Lang::Fa)]
    #[case("en-US", Lang::En)]
    #[case("de-DE, fa", Lang::Fa)]
    #[case("de-DE", Lang::En)]
    #[case("", Lang::En)]
    fn test_from_accept_language(#[case] header: &str, #[case] expected: Lang) {
        assert_eq!(Lang::from_accept_language(header), expected);
    }

    #[test]
    fn test_lookup_and_fallbacks() {
        assert_eq!(t("unbalanced", Lang::En), "Debits and credits do not balance");
        assert_eq!(t("unbalanced", Lang::Fa), "جمع بدهکار و بستانکار برابر نیست");
        assert_eq!(t("someUnknownKey", Lang::Fa), "someUnknownKey");
    }

    #[test]
    fn test_tables_cover_same_keys() {
        for (key, _) in EN {
            assert!(lookup(FA, key).is_some(), "missing fa message for {key}");
        }
        assert_eq!(EN.len(), FA.len());
    }
}
