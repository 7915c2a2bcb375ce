//! Printed strings per locale.

use crate::config::Locale;

/// Every fixed string the composer draws.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub maintenance_title: &'static str,
    pub income_title: &'static str,
    pub period: &'static str,
    pub generated: &'static str,
    pub all_periods: &'static str,
    pub kpi_title: &'static str,
    pub kpi_income: &'static str,
    pub kpi_expenses: &'static str,
    pub kpi_balance: &'static str,
    pub kpi_pending_fees: &'static str,
    pub kpi_reserve: &'static str,
    pub kpi_units: &'static str,
    pub kpi_delinquent: &'static str,
    pub kpi_open_tickets: &'static str,
    pub indicator: &'static str,
    pub value: &'static str,
    pub analysis: &'static str,
    pub reports: &'static str,
    pub tickets: &'static str,
    pub appointments: &'static str,
    pub contracts: &'static str,
    pub costs: &'static str,
    pub no_records: &'static str,
    pub by_status: &'static str,
    pub by_month: &'static str,
    pub by_category: &'static str,
    pub by_provider: &'static str,
    pub detail: &'static str,
    pub col_group: &'static str,
    pub col_count: &'static str,
    pub col_amount: &'static str,
    pub col_date: &'static str,
    pub col_start: &'static str,
    pub col_end: &'static str,
    pub col_category: &'static str,
    pub col_status: &'static str,
    pub col_provider: &'static str,
    pub col_title: &'static str,
    pub col_priority: &'static str,
    pub col_description: &'static str,
    pub col_notes: &'static str,
    pub total: &'static str,
    pub unspecified: &'static str,
    pub signature_title: &'static str,
    pub signature_intro: &'static str,
    pub page_of: &'static str,
    pub rows_omitted: &'static str,
}

const ES: Labels = Labels {
    maintenance_title: "Reporte de Mantenimiento",
    income_title: "Reporte de Ingresos",
    period: "Periodo",
    generated: "Generado",
    all_periods: "Todos los periodos",
    kpi_title: "Resumen de indicadores",
    kpi_income: "Ingresos",
    kpi_expenses: "Egresos",
    kpi_balance: "Balance",
    kpi_pending_fees: "Cuotas pendientes",
    kpi_reserve: "Fondo de reserva",
    kpi_units: "Unidades",
    kpi_delinquent: "Unidades morosas",
    kpi_open_tickets: "Tickets abiertos",
    indicator: "Indicador",
    value: "Valor",
    analysis: "Análisis",
    reports: "Reportes de mantenimiento",
    tickets: "Tickets",
    appointments: "Citas con proveedores",
    contracts: "Contratos",
    costs: "Costos",
    no_records: "No hay registros en el periodo seleccionado.",
    by_status: "Por estado",
    by_month: "Por mes",
    by_category: "Por categoría",
    by_provider: "Por proveedor",
    detail: "Detalle",
    col_group: "Grupo",
    col_count: "Cantidad",
    col_amount: "Monto",
    col_date: "Fecha",
    col_start: "Inicio",
    col_end: "Fin",
    col_category: "Categoría",
    col_status: "Estado",
    col_provider: "Proveedor",
    col_title: "Título",
    col_priority: "Prioridad",
    col_description: "Descripción",
    col_notes: "Notas",
    total: "Total",
    unspecified: "Sin especificar",
    signature_title: "Firma y contacto",
    signature_intro: "Documento emitido por la administración:",
    page_of: "Página {n} de {total}",
    rows_omitted: "{n} registros adicionales no se muestran.",
};

const EN: Labels = Labels {
    maintenance_title: "Maintenance Report",
    income_title: "Income Report",
    period: "Period",
    generated: "Generated",
    all_periods: "All periods",
    kpi_title: "Key figures",
    kpi_income: "Income",
    kpi_expenses: "Expenses",
    kpi_balance: "Balance",
    kpi_pending_fees: "Pending fees",
    kpi_reserve: "Reserve fund",
    kpi_units: "Units",
    kpi_delinquent: "Delinquent units",
    kpi_open_tickets: "Open tickets",
    indicator: "Indicator",
    value: "Value",
    analysis: "Analysis",
    reports: "Maintenance reports",
    tickets: "Tickets",
    appointments: "Provider appointments",
    contracts: "Contracts",
    costs: "Costs",
    no_records: "No records in the selected period.",
    by_status: "By status",
    by_month: "By month",
    by_category: "By category",
    by_provider: "By provider",
    detail: "Detail",
    col_group: "Group",
    col_count: "Count",
    col_amount: "Amount",
    col_date: "Date",
    col_start: "Start",
    col_end: "End",
    col_category: "Category",
    col_status: "Status",
    col_provider: "Provider",
    col_title: "Title",
    col_priority: "Priority",
    col_description: "Description",
    col_notes: "Notes",
    total: "Total",
    unspecified: "Unspecified",
    signature_title: "Signature and contact",
    signature_intro: "Issued by the administration:",
    page_of: "Page {n} of {total}",
    rows_omitted: "{n} more records not shown.",
};

impl Labels {
    pub fn for_locale(locale: Locale) -> &'static Labels {
        match locale {
            Locale::Es => &ES,
            Locale::En => &EN,
        }
    }

    /// Footer stamp for one page.
    pub fn page_stamp(&self, page: usize, total: usize) -> String {
        self.page_of
            .replace("{n}", &page.to_string())
            .replace("{total}", &total.to_string())
    }

    pub fn omitted(&self, n: usize) -> String {
        self.rows_omitted.replace("{n}", &n.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_stamp_fills_both_numbers() {
        let es = Labels::for_locale(Locale::Es);
        assert_eq!(es.page_stamp(2, 7), "Página 2 de 7");
        let en = Labels::for_locale(Locale::En);
        assert_eq!(en.page_stamp(1, 1), "Page 1 of 1");
    }

    #[test]
    fn total_key_matches_aggregate_row() {
        assert_eq!(Labels::for_locale(Locale::Es).total, crate::pipeline::aggregate::TOTAL_KEY);
    }
}
