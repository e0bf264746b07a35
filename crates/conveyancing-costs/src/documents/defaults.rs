/// Subject used until staff save their own. `[CALCULATOR_TYPE]` becomes e.g. `Transfer Cost`.
pub const DEFAULT_SUBJECT_LINE: &str = "Your [CALCULATOR_TYPE] Calculator Results";

pub const DEFAULT_PDF_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Transfer Bond Costs</title>
    <style>
        body { font-family: Arial, sans-serif; font-size: 11px; color: #000; margin: 40px; }
        .header { text-align: center; margin-bottom: 25px; padding-bottom: 15px; border-bottom: 1px solid #ccc; }
        .company-name { font-size: 14px; font-weight: bold; color: #8B4513; }
        .company-tagline { font-size: 9px; color: #8B4513; font-style: italic; }
        .section { margin-bottom: 20px; }
        .section-header { background-color: #f0f0f0; padding: 8px; font-weight: bold; border-left: 3px solid #8B4513; }
        .subtotal { font-weight: bold; margin-top: 6px; }
        .total { font-weight: bold; font-size: 14px; text-align: center; margin: 20px 0; }
        .provision { margin: 25px 0; padding: 12px; background-color: #fffacd; border: 1px solid #ddd; }
        .footer-notes { margin-top: 20px; font-size: 9px; color: #555; }
    </style>
</head>
<body>
    <div class="header">
        <div class="company-name">DYKES VAN HEERDEN GROUP OF COMPANIES</div>
        <div class="company-tagline">professionals striving for excellence</div>
        <h2>Transfer Bond Costs</h2>
        <div>[DATE]</div>
    </div>

    [TRANSFER_SECTION_START]
    <div class="section">
        <div class="section-header">TRANSFER COST ON: [TRANSFER_AMOUNT]</div>
        [TRANSFER_COSTS]
        <div class="subtotal">Sub Total: [TRANSFER_TOTAL]</div>
    </div>
    [TRANSFER_SECTION_END]

    [BOND_SECTION_START]
    <div class="section">
        <div class="section-header">BOND COST ON: [BOND_AMOUNT]</div>
        [BOND_COSTS]
        <div class="subtotal">Sub Total: [BOND_TOTAL]</div>
    </div>
    [BOND_SECTION_END]

    <div class="total">Total: [TOTAL]</div>

    <div class="provision">
        <p><strong>PROVISION MUST BE MADE FOR THE FOLLOWING AMOUNTS:</strong></p>
        <ul>
            <li>Bank admin and initiation fees of approximately R6,037.50</li>
            <li>Levies for up to 12 months (normally 3 months)</li>
            <li>Transfer of an Exclusive Use Area amount of approximately R2,000.00 per Exclusive Use Area</li>
            <li>Insurance Certificate for Sectional Title transfers in the sum of approx. R750.00</li>
            <li>Please note with Sectional Title that there are additional charges for extra Units and Exclusive Use Areas</li>
        </ul>
    </div>

    <div class="footer-notes">
        <p><strong>Please note fees here are calculated up to R500,000,000.00</strong></p>
        <p>For quotes in excess of R500,000,000.00, and for more accurate calculations, please contact us.</p>
        <p>Disclaimer: All estimated calculations done here are provided for general information purposes only and do not constitute professional advice.</p>
    </div>
</body>
</html>
"#;

/// Body of the results email. `calculator_type` is a human label, `pdf_url` must already be escaped.
pub fn email_body(calculator_type: &str, pdf_url: &str) -> String {
    format!(
        "<h2>Your {calculator_type} Calculator Results</h2>\n\
<p>Thank you for using our calculator. Your results are available as a PDF.</p>\n\
<p><a href=\"{pdf_url}\" target=\"_blank\">Download PDF Results</a></p>\n\
<p>Best regards,<br>The Team</p>\n"
    )
}
