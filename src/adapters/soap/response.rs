//! Parsing of CreatePatient responses and WSDL service addresses.

use crate::domain::payload::{CreatedPatient, ServiceError};
use crate::utils::error::{IntakeError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Values picked out of a CreatePatient response body.
#[derive(Debug, Default)]
struct ResponseFields {
    fault: Option<String>,
    is_error: bool,
    error_message: Option<String>,
    patient_id: Option<String>,
    case_ids: Vec<String>,
}

impl ResponseFields {
    fn absorb(&mut self, path: &[String], text: String) {
        let name = path.last().map(String::as_str).unwrap_or_default();
        let parent = path
            .len()
            .checked_sub(2)
            .map(|i| path[i].as_str())
            .unwrap_or_default();

        match (parent, name) {
            (_, "faultstring") | ("Reason", "Text") => {
                self.fault.get_or_insert(text);
            }
            ("ErrorResponse", "IsError") => self.is_error = parse_xsd_bool(&text),
            ("ErrorResponse", "ErrorMessage") => self.error_message = Some(text),
            ("PatientCaseRes", "CaseID") => self.case_ids.push(text),
            ("CreatePatientResult", "PatientID") => self.patient_id = Some(text),
            _ => {}
        }
    }
}

/// `xsd:boolean` allows `true`/`false` and `1`/`0`.
fn parse_xsd_bool(text: &str) -> bool {
    let text = text.trim();
    text == "1" || text.eq_ignore_ascii_case("true")
}

fn malformed(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Unexpected(format!("malformed response: {}", e))
}

/// Interprets a CreatePatient response. Faults take precedence over
/// application errors, which take precedence over a created patient.
///
/// Self-closing elements carry no text and are skipped, so `<IsError/>`
/// reads as false and `<PatientID/>` as a missing id.
pub fn parse_create_patient_response(body: &str) -> std::result::Result<CreatedPatient, ServiceError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut fields = ResponseFields::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(malformed)?;
                fields.absorb(&path, text.trim().to_string());
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).trim().to_string();
                fields.absorb(&path, text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(fault) = fields.fault {
        return Err(ServiceError::Fault(fault));
    }
    if fields.is_error {
        return Err(ServiceError::Application(
            fields.error_message.unwrap_or_default(),
        ));
    }
    match fields.patient_id {
        Some(patient_id) if !patient_id.is_empty() => Ok(CreatedPatient {
            patient_id,
            case_ids: fields.case_ids,
        }),
        _ => Err(ServiceError::Unexpected(
            "response did not contain a PatientID".to_string(),
        )),
    }
}

/// Returns the `location` of the first `address` element (`soap:address`
/// or `soap12:address`) in a WSDL document, or `None` when it has none.
pub fn parse_wsdl_endpoint(wsdl: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(wsdl);
    reader.config_mut().trim_text(true);
    let mut saw_definitions = false;

    loop {
        let event = reader.read_event().map_err(|e| IntakeError::XmlError {
            message: format!("Invalid WSDL document: {}", e),
        })?;

        match event {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"definitions" => saw_definitions = true,
                b"address" => {
                    let location = e.try_get_attribute("location").map_err(|e| {
                        IntakeError::XmlError {
                            message: format!("Invalid WSDL address: {}", e),
                        }
                    })?;
                    if let Some(location) = location {
                        let value = location.unescape_value().map_err(|e| {
                            IntakeError::XmlError {
                                message: format!("Invalid WSDL address: {}", e),
                            }
                        })?;
                        return Ok(Some(value.into_owned()));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if saw_definitions {
        Ok(None)
    } else {
        Err(IntakeError::XmlError {
            message: "Document is not a WSDL definition".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(body: &str) -> String {
        format!(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>{}</s:Body></s:Envelope>"#,
            body
        )
    }

    #[test]
    fn test_success_response() {
        let body = envelope(
            r#"<CreatePatientResponse xmlns="http://www.kareo.com/api/schemas/">
                 <CreatePatientResult xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
                   <ErrorResponse><IsError>false</IsError></ErrorResponse>
                   <SecurityResponse><Authenticated>true</Authenticated></SecurityResponse>
                   <Cases>
                     <PatientCaseRes><CaseID>5001</CaseID><CaseName>Initial Record</CaseName></PatientCaseRes>
                     <PatientCaseRes><CaseID>5002</CaseID></PatientCaseRes>
                   </Cases>
                   <PatientID>1234</PatientID>
                 </CreatePatientResult>
               </CreatePatientResponse>"#,
        );

        let created = parse_create_patient_response(&body).unwrap();
        assert_eq!(created.patient_id, "1234");
        assert_eq!(created.case_ids, vec!["5001", "5002"]);
    }

    #[test]
    fn test_application_error_message_is_verbatim() {
        let body = envelope(
            r#"<CreatePatientResponse xmlns="http://www.kareo.com/api/schemas/">
                 <CreatePatientResult>
                   <ErrorResponse>
                     <ErrorMessage>Practice &amp; provider not found</ErrorMessage>
                     <IsError>true</IsError>
                   </ErrorResponse>
                 </CreatePatientResult>
               </CreatePatientResponse>"#,
        );

        assert_eq!(
            parse_create_patient_response(&body).unwrap_err(),
            ServiceError::Application("Practice & provider not found".to_string())
        );
    }

    #[test]
    fn test_application_error_with_numeric_flag() {
        let body = envelope(
            r#"<CreatePatientResponse><CreatePatientResult>
                 <ErrorResponse><ErrorMessage>Duplicate</ErrorMessage><IsError> 1 </IsError></ErrorResponse>
               </CreatePatientResult></CreatePatientResponse>"#,
        );

        assert_eq!(
            parse_create_patient_response(&body).unwrap_err(),
            ServiceError::Application("Duplicate".to_string())
        );
    }

    #[test]
    fn test_xsd_bool() {
        assert!(parse_xsd_bool("true"));
        assert!(parse_xsd_bool("TRUE"));
        assert!(parse_xsd_bool("1"));
        assert!(!parse_xsd_bool("0"));
        assert!(!parse_xsd_bool("false"));
        assert!(!parse_xsd_bool(""));
    }

    #[test]
    fn test_empty_elements_are_ignored() {
        let body = envelope(
            r#"<CreatePatientResponse><CreatePatientResult>
                 <ErrorResponse><ErrorMessage>ignored</ErrorMessage><IsError/></ErrorResponse>
                 <PatientID/>
               </CreatePatientResult></CreatePatientResponse>"#,
        );
        assert_eq!(
            parse_create_patient_response(&body).unwrap_err(),
            ServiceError::Unexpected("response did not contain a PatientID".to_string())
        );

        let with_cases = envelope(
            r#"<CreatePatientResponse><CreatePatientResult>
                 <ErrorResponse><IsError/></ErrorResponse>
                 <Cases><PatientCaseRes><CaseID/></PatientCaseRes></Cases>
                 <PatientID>12</PatientID>
               </CreatePatientResult></CreatePatientResponse>"#,
        );
        let created = parse_create_patient_response(&with_cases).unwrap();
        assert_eq!(created.patient_id, "12");
        assert!(created.case_ids.is_empty());
    }

    #[test]
    fn test_soap_fault() {
        let body = envelope(
            r#"<s:Fault><faultcode>s:Client</faultcode><faultstring xml:lang="en-US">Invalid credentials</faultstring></s:Fault>"#,
        );

        let err = parse_create_patient_response(&body).unwrap_err();
        assert_eq!(err, ServiceError::Fault("Invalid credentials".to_string()));
        assert_eq!(err.to_string(), "SOAP Fault: Invalid credentials");
    }

    #[test]
    fn test_missing_patient_id_is_unexpected() {
        let body = envelope("<CreatePatientResponse><CreatePatientResult/></CreatePatientResponse>");
        assert!(matches!(
            parse_create_patient_response(&body),
            Err(ServiceError::Unexpected(_))
        ));
    }

    #[test]
    fn test_garbage_body_is_unexpected() {
        let err = parse_create_patient_response("<a><b></a>").unwrap_err();
        assert!(err.to_string().starts_with("An unexpected error occurred:"));
    }

    #[test]
    fn test_wsdl_endpoint() {
        let wsdl = r#"<?xml version="1.0"?>
            <wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
                              xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/">
              <wsdl:service name="KareoServices">
                <wsdl:port name="BasicHttpBinding_KareoServices">
                  <soap:address location="https://example.com/svc/KareoServices.svc?a=1&amp;b=2"/>
                </wsdl:port>
              </wsdl:service>
            </wsdl:definitions>"#;

        assert_eq!(
            parse_wsdl_endpoint(wsdl).unwrap().as_deref(),
            Some("https://example.com/svc/KareoServices.svc?a=1&b=2")
        );
    }

    #[test]
    fn test_wsdl_without_address() {
        let wsdl = r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"><types/></definitions>"#;
        assert_eq!(parse_wsdl_endpoint(wsdl).unwrap(), None);
    }

    #[test]
    fn test_non_wsdl_document_is_rejected() {
        assert!(parse_wsdl_endpoint("<html><body>Service down</body></html>").is_err());
    }
}
