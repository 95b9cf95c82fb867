/*!
 * User-facing message catalog.
 *
 * Every error leaving the service carries a stable code. The code is looked up
 * here to produce the Indonesian text shown to warehouse staff; codes without
 * an entry fall back to [`GENERIC_MESSAGE`].
 */

use std::collections::HashMap;

use lazy_static::lazy_static;

pub const GENERIC_MESSAGE: &str = "Terjadi kesalahan. Silakan coba lagi.";

pub mod codes {
    // Generic
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const CONFLICT: &str = "CONFLICT";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

    // Authentication
    pub const AUTH_MISSING_CREDENTIALS: &str = "AUTH_MISSING_CREDENTIALS";
    pub const AUTH_INVALID_CREDENTIALS: &str = "AUTH_INVALID_CREDENTIALS";
    pub const AUTH_ACCOUNT_NOT_REGISTERED: &str = "AUTH_ACCOUNT_NOT_REGISTERED";
    pub const AUTH_ACCOUNT_DISABLED: &str = "AUTH_ACCOUNT_DISABLED";
    pub const AUTH_INVALID_TOKEN: &str = "AUTH_INVALID_TOKEN";
    pub const AUTH_TOKEN_EXPIRED: &str = "AUTH_TOKEN_EXPIRED";
    pub const AUTH_INSUFFICIENT_PERMISSIONS: &str = "AUTH_INSUFFICIENT_PERMISSIONS";
    pub const AUTH_INTERNAL_ERROR: &str = "AUTH_INTERNAL_ERROR";

    // Items
    pub const REJECTION_NOTE_REQUIRED: &str = "ITEM_REJECTION_NOTE_REQUIRED";
    pub const INVALID_TARGET_STATUS: &str = "ITEM_INVALID_TARGET_STATUS";
    pub const ITEM_NOT_PENDING: &str = "ITEM_NOT_PENDING";
    pub const CONCURRENT_VERIFICATION: &str = "ITEM_CONCURRENT_VERIFICATION";
    pub const LOCATION_REQUIRED: &str = "ITEM_LOCATION_REQUIRED";
    pub const QUANTITY_TOO_SMALL: &str = "ITEM_QUANTITY_TOO_SMALL";
    pub const NEGATIVE_QUANTITY: &str = "ITEM_NEGATIVE_QUANTITY";
    pub const FRACTIONAL_QUANTITY: &str = "ITEM_FRACTIONAL_QUANTITY";
    pub const MATERIAL_NAME_REQUIRED: &str = "ITEM_MATERIAL_NAME_REQUIRED";
    pub const EMPTY_EDIT: &str = "ITEM_EMPTY_EDIT";
    pub const ITEM_LOCKED: &str = "ITEM_LOCKED";

    // Catalog
    pub const MATERIAL_CODE_REQUIRED: &str = "MATERIAL_CODE_REQUIRED";

    // Users
    pub const EMAIL_TAKEN: &str = "USER_EMAIL_TAKEN";
    pub const INVALID_EMAIL: &str = "USER_INVALID_EMAIL";
    pub const WEAK_PASSWORD: &str = "USER_WEAK_PASSWORD";
    pub const NAME_REQUIRED: &str = "USER_NAME_REQUIRED";
    pub const SELF_DEACTIVATION: &str = "USER_SELF_DEACTIVATION";

    // Notifications and reports
    pub const NOTIFICATION_INCOMPLETE: &str = "NOTIFICATION_INCOMPLETE";
    pub const NOTHING_TO_EXPORT: &str = "REPORT_NOTHING_TO_EXPORT";
}

lazy_static! {
    static ref MESSAGES: HashMap<&'static str, &'static str> = {
        use codes::*;
        let mut m = HashMap::new();
        m.insert(NOT_FOUND, "Data tidak ditemukan.");
        m.insert(VALIDATION_ERROR, "Data tidak valid. Periksa kembali isian Anda.");
        m.insert(UNAUTHORIZED, "Silakan login terlebih dahulu.");
        m.insert(FORBIDDEN, "Anda tidak memiliki akses ke halaman ini");
        m.insert(CONFLICT, "Data telah diubah oleh pengguna lain. Muat ulang dan coba lagi.");

        m.insert(AUTH_MISSING_CREDENTIALS, "Silakan login terlebih dahulu.");
        m.insert(AUTH_INVALID_CREDENTIALS, "Email atau password salah.");
        m.insert(
            AUTH_ACCOUNT_NOT_REGISTERED,
            "Akun tidak terdaftar dalam sistem. Hubungi Admin.",
        );
        m.insert(
            AUTH_ACCOUNT_DISABLED,
            "Akun Anda telah dinonaktifkan. Hubungi Admin.",
        );
        m.insert(AUTH_INVALID_TOKEN, "Sesi tidak valid. Silakan login kembali.");
        m.insert(AUTH_TOKEN_EXPIRED, "Sesi Anda telah berakhir. Silakan login kembali.");
        m.insert(
            AUTH_INSUFFICIENT_PERMISSIONS,
            "Anda tidak memiliki akses ke halaman ini",
        );

        m.insert(REJECTION_NOTE_REQUIRED, "Catatan penolakan wajib diisi.");
        m.insert(
            INVALID_TARGET_STATUS,
            "Status tujuan harus disetujui atau ditolak.",
        );
        m.insert(ITEM_NOT_PENDING, "Item sudah diverifikasi sebelumnya.");
        m.insert(
            CONCURRENT_VERIFICATION,
            "Item diubah pengguna lain saat diverifikasi, muat ulang lalu coba lagi.",
        );
        m.insert(LOCATION_REQUIRED, "Lokasi penyimpanan wajib diisi.");
        m.insert(QUANTITY_TOO_SMALL, "Jumlah minimal 1.");
        m.insert(NEGATIVE_QUANTITY, "Jumlah tidak boleh negatif.");
        m.insert(FRACTIONAL_QUANTITY, "Jumlah harus berupa bilangan bulat.");
        m.insert(MATERIAL_NAME_REQUIRED, "Nama material wajib diisi.");
        m.insert(EMPTY_EDIT, "Tidak ada perubahan yang disimpan.");
        m.insert(
            ITEM_LOCKED,
            "Item yang sudah diverifikasi tidak dapat diubah.",
        );

        m.insert(MATERIAL_CODE_REQUIRED, "Kode material wajib diisi.");

        m.insert(EMAIL_TAKEN, "Email sudah terdaftar.");
        m.insert(INVALID_EMAIL, "Format email tidak valid.");
        m.insert(WEAK_PASSWORD, "Password terlalu lemah (min. 6 karakter).");
        m.insert(NAME_REQUIRED, "Nama wajib diisi.");
        m.insert(
            SELF_DEACTIVATION,
            "Anda tidak dapat menonaktifkan akun sendiri.",
        );

        m.insert(NOTIFICATION_INCOMPLETE, "Judul dan pesan harus diisi");
        m.insert(NOTHING_TO_EXPORT, "Tidak ada data untuk diexport");
        m
    };
}

/// Returns the localized message for `code`, or the generic fallback.
pub fn localize(code: &str) -> &'static str {
    MESSAGES.get(code).copied().unwrap_or(GENERIC_MESSAGE)
}
