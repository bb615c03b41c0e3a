//! OIDs used by the CMS KEM envelope schema

macro_rules! define_oid {
    ($uppercase:ident => $lowercase:ident => $str_value:literal) => {
        pub const $uppercase: &str = $str_value;

        pub fn $lowercase() -> oid::ObjectIdentifier {
            use std::sync::OnceLock;

            static OID: OnceLock<oid::ObjectIdentifier> = OnceLock::new();
            OID.get_or_init(|| $uppercase.try_into().expect("hardcoded oid"))
                .clone()
        }
    };
    ( $( $uppercase:ident => $lowercase:ident => $str_value:literal, )+ ) => {
        $( define_oid! { $uppercase => $lowercase => $str_value } )+
    };
}

define_oid! {
    // CMS content types
    ID_DATA => id_data => "1.2.840.113549.1.7.1",
    ID_ENVELOPED_DATA => id_enveloped_data => "1.2.840.113549.1.7.3",
    ID_CT_AUTH_ENVELOPED_DATA => id_ct_auth_enveloped_data => "1.2.840.113549.1.9.16.1.23",

    // RFC 9629
    ID_ORI_KEM => id_ori_kem => "1.2.840.113549.1.9.16.13.3",

    // RFC 8619
    ID_ALG_HKDF_WITH_SHA256 => id_alg_hkdf_with_sha256 => "1.2.840.113549.1.9.16.3.28",

    // CMS attributes
    ID_AA_INTENDED_RECIPIENTS => id_aa_intended_recipients => "1.2.840.113549.1.9.16.2.33",

    // NIST AES
    AES128_WRAP => aes128_wrap => "2.16.840.1.101.3.4.1.5",
    AES128_GCM => aes128_gcm => "2.16.840.1.101.3.4.1.6",
    AES256_WRAP => aes256_wrap => "2.16.840.1.101.3.4.1.45",
    AES256_GCM => aes256_gcm => "2.16.840.1.101.3.4.1.46",

    // NIST ML-KEM (FIPS 203)
    ID_ALG_ML_KEM_512 => id_alg_ml_kem_512 => "2.16.840.1.101.3.4.4.1",
    ID_ALG_ML_KEM_768 => id_alg_ml_kem_768 => "2.16.840.1.101.3.4.4.2",
    ID_ALG_ML_KEM_1024 => id_alg_ml_kem_1024 => "2.16.840.1.101.3.4.4.3",
}
