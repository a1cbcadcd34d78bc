pub mod annex;
pub mod entity;
pub mod enums;
pub mod history;
pub mod invoice;
pub mod rips;
pub mod validation;

pub use annex::{AnnexInfo, AnnexMedicationLine, AnnexOtherServiceLine, AnnexPatient};
pub use entity::ClinicalEntity;
pub use enums::{
    EntityKind, EntitySource, FieldProvenance, InvalidEnumValue, RecordSource, Severity,
};
pub use history::{ConsultationInfo, HistoryInfo};
pub use invoice::{InvoiceInfo, ServiceLine};
pub use rips::{
    ConsultationRecord, DiscardedValue, InvoiceRecord, MedicationRecord, OtherServiceRecord,
    PatientIdentity, ProcedureRecord, RipsRecordSet, Sourced, UserRecord,
};
pub use validation::{ValidationFinding, ValidationReport};
