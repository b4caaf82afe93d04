use chrono::NaiveDateTime;
use mockall::mock;

use crate::models::{
    DbAppointment, DbMedicineStock, DbPatient, DbPrescription, DbPrescriptionItem, DbRecord,
    DbSchedule,
};

// Mock repositories for testing

mock! {
    pub PatientRepo {
        pub async fn get_patient_by_id(&self, patient_id: i64) -> eyre::Result<Option<DbPatient>>;

        pub async fn get_patient_by_user_id(&self, user_id: i64) -> eyre::Result<Option<DbPatient>>;
    }
}

mock! {
    pub ScheduleRepo {
        pub async fn get_schedule_by_id(&self, schedule_id: i64) -> eyre::Result<Option<DbSchedule>>;

        pub async fn lock_schedule(&self, schedule_id: i64) -> eyre::Result<Option<DbSchedule>>;
    }
}

mock! {
    pub AppointmentRepo {
        pub async fn count_active_for_schedule(&self, schedule_id: i64) -> eyre::Result<i64>;

        pub async fn exists_active_at(
            &self,
            patient_id: i64,
            appt_time: NaiveDateTime,
        ) -> eyre::Result<bool>;

        pub async fn insert_appointment(
            &self,
            patient_id: i64,
            doctor_id: i64,
            schedule_id: i64,
            appt_time: NaiveDateTime,
            symptom_desc: Option<String>,
        ) -> eyre::Result<DbAppointment>;

        pub async fn get_appointment_by_id(&self, appt_id: i64) -> eyre::Result<Option<DbAppointment>>;

        pub async fn set_status(&self, appt_id: i64, status: i16) -> eyre::Result<DbAppointment>;
    }
}

mock! {
    pub RecordRepo {
        pub async fn get_record_by_id(&self, id: String) -> eyre::Result<Option<DbRecord>>;

        pub async fn set_status(&self, id: String, status: String) -> eyre::Result<DbRecord>;
    }
}

mock! {
    pub StockRepo {
        pub async fn lock_stock(&self, medicine_id: i64) -> eyre::Result<Option<DbMedicineStock>>;

        pub async fn add_stock(&self, medicine_id: i64, quantity: i32) -> eyre::Result<()>;

        pub async fn deduct_stock(&self, medicine_id: i64, quantity: i32) -> eyre::Result<()>;
    }
}

mock! {
    pub PrescriptionRepo {
        pub async fn lock_prescription(&self, id: String) -> eyre::Result<Option<DbPrescription>>;

        pub async fn get_items(&self, prescription_id: String) -> eyre::Result<Vec<DbPrescriptionItem>>;

        pub async fn set_status(&self, id: String, status: String) -> eyre::Result<DbPrescription>;
    }
}
