//! SOAP 1.1 request bodies for the patient service.

use crate::domain::payload::{PatientPayload, RequestHeader};
use quick_xml::escape::escape;

pub const SCHEMA_NS: &str = "http://www.kareo.com/api/schemas/";
pub const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const CREATE_PATIENT_ACTION: &str =
    "http://www.kareo.com/api/schemas/KareoServices/CreatePatient";

/// Minimal writer for `sch:`-prefixed elements. Text is always escaped.
struct Body {
    out: String,
}

impl Body {
    fn open(&mut self, name: &str) {
        self.out.push_str("<sch:");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn close(&mut self, name: &str) {
        self.out.push_str("</sch:");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn text(&mut self, name: &str, value: &str) {
        self.open(name);
        self.out.push_str(&escape(value));
        self.close(name);
    }

    fn optional(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.text(name, value);
        }
    }
}

/// Data-contract members are emitted in alphabetical order, which is what
/// the service's WCF deserializer expects.
pub fn create_patient_envelope(header: &RequestHeader, patient: &PatientPayload) -> String {
    let mut body = Body { out: String::new() };

    body.out.push_str(&format!(
        r#"<?xml version="1.0" encoding="utf-8"?><soapenv:Envelope xmlns:soapenv="{}" xmlns:sch="{}"><soapenv:Header/><soapenv:Body>"#,
        ENVELOPE_NS, SCHEMA_NS
    ));
    body.open("CreatePatient");
    body.open("request");

    body.open("RequestHeader");
    body.text("CustomerKey", &header.customer_key);
    body.text("Password", &header.password);
    body.text("User", &header.user);
    body.close("RequestHeader");

    body.open("Patient");
    body.optional("AddressLine1", patient.address_line1.as_deref());
    body.open("Cases");
    for case in &patient.cases {
        body.open("PatientCaseCreateReq");
        body.text("Active", if case.active { "true" } else { "false" });
        body.text("CaseName", &case.name);
        body.close("PatientCaseCreateReq");
    }
    body.close("Cases");
    body.optional("City", patient.city.as_deref());
    body.text(
        "DateofBirth",
        &patient
            .date_of_birth
            .format("%Y-%m-%dT00:00:00")
            .to_string(),
    );
    body.optional("EmailAddress", patient.email_address.as_deref());
    body.text("FirstName", &patient.first_name);
    body.text("Gender", &patient.gender);
    body.optional("HomePhone", patient.home_phone.as_deref());
    body.text("LastName", &patient.last_name);
    body.optional("MedicalRecordNumber", patient.medical_record_number.as_deref());
    body.optional("MobilePhone", patient.mobile_phone.as_deref());
    body.open("Practice");
    body.text("PracticeName", &patient.practice_name);
    body.close("Practice");
    body.optional(
        "SocialSecurityNumber",
        patient.social_security_number.as_deref(),
    );
    body.optional("State", patient.state.as_deref());
    body.optional("ZipCode", patient.zip_code.as_deref());
    body.close("Patient");

    body.close("request");
    body.close("CreatePatient");
    body.out.push_str("</soapenv:Body></soapenv:Envelope>");
    body.out
}
